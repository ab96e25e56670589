use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StartupError {
    #[error("Frontend Missing Error: {message} {location}")]
    FrontendMissing {
        message: String,
        location: ErrorLocation,
    },

    #[error("Bind Error: {message} {location}")]
    Bind {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid URI Error: {message} {location}")]
    InvalidUri {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not Ready Error: {message} {location}")]
    NotReady {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for StartupError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        StartupError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for StartupError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        StartupError::InvalidUri {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
