//! Best-effort lookup of the process listening on a loopback port.

use std::fmt::{Display, Formatter, Result as FormatResult};

use log::{debug, trace};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, TcpState, get_sockets_info,
};
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Process found listening on a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOwner {
    pub pid: u32,
    pub name: Option<String>,
}

impl Display for PortOwner {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self.name {
            Some(ref name) => write!(formatter, "{name} (PID {})", self.pid),
            None => write!(formatter, "PID {}", self.pid),
        }
    }
}

/// Find which process is listening on `port`.
///
/// Returns `None` when the socket table cannot be read, nobody listens on
/// the port, or the listener has no associated PID (e.g. another user's
/// process without sufficient privileges).
pub fn describe_port_owner(port: u16) -> Option<PortOwner> {
    let sockets = match get_sockets_info(
        AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6,
        ProtocolFlags::TCP,
    ) {
        Ok(sockets) => sockets,
        Err(e) => {
            debug!("Failed to query network sockets for port {port}: {e}");
            return None;
        }
    };

    let pid = sockets.into_iter().find_map(|s| match &s.protocol_socket_info {
        ProtocolSocketInfo::Tcp(tcp) if tcp.state == TcpState::Listen && tcp.local_port == port => {
            s.associated_pids.first().copied()
        }
        _ => None,
    })?;

    trace!("Found process {pid} listening on port {port}");

    Some(PortOwner {
        pid,
        name: process_name(pid),
    })
}

fn process_name(pid: u32) -> Option<String> {
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    sys.process(pid)
        .map(|p| p.name().to_string_lossy().to_string())
}
