//! Embedded backend for the DesktopApp shell.
//!
//! Finds a loopback port, serves the frontend bundle plus a small metadata
//! API from an in-process HTTP server, and ties that server's lifetime to
//! the shell through [`lifecycle::HostCoordinator`].

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metadata;
pub mod ports;
pub mod server;

#[cfg(test)]
mod tests;

pub const LOOPBACK_HOSTNAME: &str = "127.0.0.1";
pub const BACKEND_BASE_URL: &str = const_format::concatcp!("http://", LOOPBACK_HOSTNAME);

/// Port tried first when the shell starts.
pub const DEFAULT_PORT: u16 = 54321;

/// Port of the external frontend dev server used in development mode.
pub const DEV_FRONTEND_PORT: u16 = 4200;
pub const DEV_FRONTEND_URL: &str =
    const_format::concatcp!("http://localhost:", DEV_FRONTEND_PORT, "/");

pub const API_PREFIX: &str = "/api";
pub const METADATA_ROUTE: &str = const_format::concatcp!(API_PREFIX, "/metadata");
