//! Connection source port (interface).

use crate::domain::ConnectionState;
use crate::error::Result;

/// One socket from the system socket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketEntry {
    pub pid: u32,
    pub port: u16,
    pub state: ConnectionState,
}

impl SocketEntry {
    pub fn new(pid: u32, port: u16, state: ConnectionState) -> Self {
        Self { pid, port, state }
    }
}

/// Port for enumerating IPv4/IPv6 TCP and UDP sockets.
///
/// Implementations handle platform-specific details (ss, lsof, ...).
pub trait ConnectionSource: Send + Sync {
    /// Enumerate every socket with an owning pid, in system order.
    fn connections(&self) -> impl std::future::Future<Output = Result<Vec<SocketEntry>>> + Send;
}
