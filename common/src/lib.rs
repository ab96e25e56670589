//! Shared building blocks for the DesktopApp workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): error location tracking and small helpers
//! - **models**: pure data records exchanged over the HTTP API
//! - **host-core**: embedded server bootstrap and lifecycle coordination
//! - **desktop-app**: shell entry point wiring everything to a display surface

pub mod error;
pub mod http_status;

pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;

#[cfg(test)]
mod tests;
