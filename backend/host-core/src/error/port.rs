use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PortError {
    #[error("Port Bind Error: {message} {location}")]
    Bind {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Local Address Error: {message} {location}")]
    LocalAddr {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },
}
