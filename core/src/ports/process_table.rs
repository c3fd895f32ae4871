//! Process table port (interface).

use crate::error::Result;

/// Raw fields for one live process as read from the OS.
///
/// Each field is read independently; `None` means that particular read
/// failed (permission denied, process exited mid-read, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub working_directory: Option<String>,
    pub command_line: Option<String>,
    pub cpu_percent: Option<f32>,
    pub memory_bytes: Option<u64>,
}

impl RawProcess {
    /// A process whose fields have not been read yet.
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            ..Self::default()
        }
    }
}

/// Port for enumerating live processes.
///
/// Implementations return an error only when the process list itself cannot
/// be produced; per-field failures are reported through `RawProcess`.
pub trait ProcessTable: Send + Sync {
    /// Enumerate every live process.
    fn processes(&self) -> impl std::future::Future<Output = Result<Vec<RawProcess>>> + Send;
}
