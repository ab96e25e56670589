//! Loopback port selection.
//!
//! Availability is decided by a live bind-and-release probe. Another process
//! can claim a probed port before the server binds it; the server's own bind
//! surfaces that as a startup failure.

pub mod owner;

use crate::error::port::PortError;

use common::ErrorLocation;

use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::panic::Location;

use log::{debug, trace, warn};

/// Check whether `port` can be bound on the loopback interface right now.
///
/// The probe listener is released before returning. Any bind failure
/// (in use, permission denied, ...) counts as unavailable.
pub fn is_available(port: u16) -> bool {
    match TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)) {
        Ok(_listener) => {
            trace!("Port {port} is available");
            true
        }
        Err(e) => {
            trace!("Port {port} is unavailable: {e}");
            false
        }
    }
}

/// Ask the OS for a free loopback port, release it, and return its number.
#[track_caller]
pub fn allocate_ephemeral() -> Result<u16, PortError> {
    let listener = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)).map_err(|e| {
        PortError::Bind {
            message: format!("Failed to bind an ephemeral loopback port: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        }
    })?;

    let port = listener
        .local_addr()
        .map_err(|e| PortError::LocalAddr {
            message: format!("Failed to read the assigned ephemeral port: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?
        .port();

    debug!("OS assigned ephemeral port {port}");
    Ok(port)
}

/// Pick the port the backend will listen on.
///
/// Returns `preferred_port` when it is free, otherwise warns and falls back
/// to an OS-assigned ephemeral port.
#[track_caller]
pub fn select_endpoint(preferred_port: u16) -> Result<u16, PortError> {
    if is_available(preferred_port) {
        debug!("Preferred port {preferred_port} is available");
        return Ok(preferred_port);
    }

    let port = allocate_ephemeral()?;

    match owner::describe_port_owner(preferred_port) {
        Some(port_owner) => warn!(
            "Default port {preferred_port} is unavailable (held by {port_owner}), picking a new port ({port})..."
        ),
        None => warn!("Default port {preferred_port} is unavailable, picking a new port ({port})..."),
    }

    Ok(port)
}
