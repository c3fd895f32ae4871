//! Process table adapter backed by `sysinfo`.

use std::time::Duration;

use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, Users};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::{ProcessTable, RawProcess};

/// Reads the live process list through `sysinfo`.
///
/// Each call builds a fresh `System`, samples twice `sample_interval`
/// apart so CPU usage is meaningful, and keeps nothing afterwards.
pub struct SysinfoProcessTable {
    sample_interval: Duration,
}

impl SysinfoProcessTable {
    /// Create a table sampling CPU over sysinfo's minimum update interval.
    pub fn new() -> Self {
        Self {
            sample_interval: sysinfo::MINIMUM_CPU_UPDATE_INTERVAL,
        }
    }

    /// Create a table with a custom CPU sampling window.
    pub fn with_sample_interval(sample_interval: Duration) -> Self {
        Self { sample_interval }
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SysinfoProcessTable {
    async fn processes(&self) -> Result<Vec<RawProcess>> {
        let sample_interval = self.sample_interval;
        tokio::task::spawn_blocking(move || read_process_table(sample_interval))
            .await
            .map_err(|e| Error::CollectionFailed(format!("process table task failed: {}", e)))?
    }
}

fn read_process_table(sample_interval: Duration) -> Result<Vec<RawProcess>> {
    if !sysinfo::IS_SUPPORTED_SYSTEM {
        return Err(Error::UnsupportedPlatform(format!(
            "process enumeration is not supported on {}",
            std::env::consts::OS
        )));
    }

    let refresh = ProcessRefreshKind::everything();
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);
    std::thread::sleep(sample_interval);
    system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

    // On Linux tasks show up alongside their process; keep processes only.
    let processes: Vec<(&Pid, &Process)> = system
        .processes()
        .iter()
        .filter(|(_, process)| process.thread_kind().is_none())
        .collect();
    if processes.is_empty() {
        return Err(Error::CollectionFailed(
            "process table returned no processes".to_string(),
        ));
    }

    let users = Users::new_with_refreshed_list();
    let raw: Vec<RawProcess> = processes
        .into_iter()
        .map(|(pid, process)| read_fields(pid.as_u32(), process, &users))
        .collect();

    debug!(count = raw.len(), "Read process table");
    Ok(raw)
}

fn read_fields(pid: u32, process: &Process, users: &Users) -> RawProcess {
    let name = process.name().to_string_lossy().into_owned();

    let owner = process
        .user_id()
        .and_then(|uid| users.get_user_by_id(uid))
        .map(|user| user.name().to_string());

    let working_directory = process
        .cwd()
        .map(|path| path.to_string_lossy().into_owned())
        .filter(|cwd| !cwd.is_empty());

    let command_parts: Vec<String> = process
        .cmd()
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let command_line = if command_parts.is_empty() {
        None
    } else {
        Some(command_parts.join(" "))
    };

    RawProcess {
        pid,
        name: if name.is_empty() { None } else { Some(name) },
        owner,
        working_directory,
        command_line,
        cpu_percent: Some(process.cpu_usage().max(0.0)),
        memory_bytes: Some(process.memory()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_own_process() {
        let table = SysinfoProcessTable::with_sample_interval(Duration::from_millis(10));
        let processes = table.processes().await.unwrap();

        let own_pid = std::process::id();
        let own = processes.iter().find(|p| p.pid == own_pid);
        assert!(own.is_some());
        assert!(own.unwrap().name.is_some());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_threads_are_not_listed_as_processes() {
        use std::sync::mpsc;

        let (tid_tx, tid_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let worker = std::thread::spawn(move || {
            tid_tx.send(nix::unistd::gettid().as_raw() as u32).unwrap();
            let _ = done_rx.recv();
        });
        let tid = tid_rx.recv().unwrap();

        let table = SysinfoProcessTable::with_sample_interval(Duration::from_millis(10));
        let processes = table.processes().await.unwrap();

        done_tx.send(()).unwrap();
        worker.join().unwrap();

        assert_ne!(tid, std::process::id());
        assert!(processes.iter().any(|p| p.pid == std::process::id()));
        assert!(processes.iter().all(|p| p.pid != tid));
    }
}
