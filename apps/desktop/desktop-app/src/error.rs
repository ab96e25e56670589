use common::ErrorLocation;
use host_core::error::HostError;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the desktop shell.
///
/// Serializable so they can be handed to a webview as-is; the structured
/// location is kept for the log file.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ShellError {
    /// Error from the shell itself (directories, logger, runtime)
    #[error("Shell Error: {message} {location}")]
    Shell {
        message: String,
        location: ErrorLocation,
    },

    /// Error from host-core operations (config, port, start, stop)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// The display surface could not be created or failed while open
    #[error("Surface Error: {message} {location}")]
    Surface {
        message: String,
        location: ErrorLocation,
    },
}

impl From<HostError> for ShellError {
    #[track_caller]
    fn from(error: HostError) -> Self {
        ShellError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
