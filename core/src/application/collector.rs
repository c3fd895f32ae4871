//! Snapshot collection service.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::adapters::{SocketScanner, SysinfoProcessTable};
use crate::domain::{AppType, Classification, Connection, ProcessRecord, ProcessSnapshot};
use crate::error::{Error, Result};
use crate::ports::{ConnectionSource, ProcessTable, RawProcess, SocketEntry};

/// Owner recorded when the owner field cannot be read.
pub const UNKNOWN_OWNER: &str = "unknown";

/// Collector wired to the real OS adapters.
pub type SystemCollector = SnapshotCollector<SysinfoProcessTable, SocketScanner>;

/// Builds one consistent [`ProcessSnapshot`] per call.
///
/// Uses the `ProcessTable` and `ConnectionSource` ports for the OS reads,
/// allowing different implementations to be injected. Holds no state
/// between calls.
pub struct SnapshotCollector<P: ProcessTable, C: ConnectionSource> {
    processes: P,
    connections: C,
}

impl SystemCollector {
    /// Collector backed by sysinfo and the platform socket scanner.
    pub fn system() -> Self {
        Self::new(SysinfoProcessTable::new(), SocketScanner::new())
    }
}

impl<P: ProcessTable, C: ConnectionSource> SnapshotCollector<P, C> {
    /// Create a new collector with the given sources.
    pub fn new(processes: P, connections: C) -> Self {
        Self {
            processes,
            connections,
        }
    }

    /// Capture every live process, classified against `current_user`.
    ///
    /// Fails only when the process list itself cannot be read. A failed
    /// socket enumeration yields records without connections.
    pub async fn collect(&self, current_user: &str) -> Result<ProcessSnapshot> {
        let (processes, connections) =
            tokio::join!(self.processes.processes(), self.connections.connections());

        let processes = processes.map_err(|e| match e {
            Error::CollectionFailed(_) => e,
            other => Error::CollectionFailed(other.to_string()),
        })?;

        let mut by_pid = match connections {
            Ok(entries) => group_by_pid(entries),
            Err(e) => {
                warn!(error = %e, "Connection enumeration failed, continuing without port data");
                HashMap::new()
            }
        };

        let total = processes.len();
        let records: Vec<ProcessRecord> = processes
            .into_iter()
            .filter_map(|raw| {
                let connections = by_pid.remove(&raw.pid).unwrap_or_default();
                build_record(raw, current_user, connections)
            })
            .collect();

        debug!(
            total = total,
            kept = records.len(),
            dropped = total - records.len(),
            "Collected process snapshot"
        );

        Ok(ProcessSnapshot::captured_now(records))
    }
}

/// Group socket entries by pid, keeping enumeration order within each pid.
fn group_by_pid(entries: Vec<SocketEntry>) -> HashMap<u32, Vec<Connection>> {
    let mut by_pid: HashMap<u32, Vec<Connection>> = HashMap::new();
    for entry in entries {
        let connection = Connection::new(entry.port, entry.state);
        let list = by_pid.entry(entry.pid).or_default();
        if !list.contains(&connection) {
            list.push(connection);
        }
    }
    by_pid
}

/// Turn raw field reads into a record, substituting defaults for failed reads.
///
/// Returns `None` when the name is unreadable: the process most likely
/// exited while it was being read.
fn build_record(
    raw: RawProcess,
    current_user: &str,
    connections: Vec<Connection>,
) -> Option<ProcessRecord> {
    let name = raw.name?;
    let owner = raw.owner.unwrap_or_else(|| UNKNOWN_OWNER.to_string());
    let working_directory = raw.working_directory.unwrap_or_default();
    let command_line = raw.command_line.unwrap_or_default();

    Some(ProcessRecord {
        pid: raw.pid,
        classification: Classification::classify(&owner, current_user),
        app_type: AppType::detect(&name, &working_directory, &command_line),
        name,
        owner,
        working_directory,
        command_line,
        connections,
        cpu_percent: raw.cpu_percent.unwrap_or(0.0),
        memory_bytes: raw.memory_bytes.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionState;

    struct MockTable {
        result: fn() -> Result<Vec<RawProcess>>,
    }

    impl ProcessTable for MockTable {
        async fn processes(&self) -> Result<Vec<RawProcess>> {
            (self.result)()
        }
    }

    struct MockSockets {
        entries: Option<Vec<SocketEntry>>,
    }

    impl ConnectionSource for MockSockets {
        async fn connections(&self) -> Result<Vec<SocketEntry>> {
            self.entries
                .clone()
                .ok_or_else(|| Error::CommandFailed("ss not found".to_string()))
        }
    }

    fn full(pid: u32, name: &str, owner: &str) -> RawProcess {
        RawProcess {
            pid,
            name: Some(name.to_string()),
            owner: Some(owner.to_string()),
            working_directory: Some("/srv".to_string()),
            command_line: Some(format!("/usr/bin/{name}")),
            cpu_percent: Some(1.5),
            memory_bytes: Some(4096),
        }
    }

    fn table() -> Result<Vec<RawProcess>> {
        Ok(vec![
            full(100, "worker", "alice"),
            full(200, "web", "alice"),
            full(300, "sshd", "root"),
        ])
    }

    fn sockets() -> Vec<SocketEntry> {
        vec![
            SocketEntry::new(200, 8080, ConnectionState::Listening),
            SocketEntry::new(300, 22, ConnectionState::Listening),
            SocketEntry::new(200, 51000, ConnectionState::Other),
            SocketEntry::new(999, 53, ConnectionState::Other),
        ]
    }

    #[tokio::test]
    async fn test_collect_classifies_and_attaches_connections() {
        let collector = SnapshotCollector::new(
            MockTable { result: table },
            MockSockets {
                entries: Some(sockets()),
            },
        );

        let snapshot = collector.collect("alice").await.unwrap();
        assert_eq!(snapshot.len(), 3);

        let web = snapshot.find(200).unwrap();
        assert_eq!(web.classification, Classification::OwnedByCurrentUser);
        assert_eq!(
            web.connections,
            vec![Connection::listening(8080), Connection::other(51000)]
        );

        let worker = snapshot.find(100).unwrap();
        assert!(worker.connections.is_empty());

        let sshd = snapshot.find(300).unwrap();
        assert_eq!(sshd.classification, Classification::SystemOwned);
    }

    #[tokio::test]
    async fn test_unreadable_name_drops_record() {
        fn table() -> Result<Vec<RawProcess>> {
            let mut gone = full(2, "ghost", "alice");
            gone.name = None;
            let mut no_cwd = full(3, "shell", "alice");
            no_cwd.working_directory = None;
            Ok(vec![full(1, "init", "root"), gone, no_cwd])
        }

        let collector = SnapshotCollector::new(
            MockTable { result: table },
            MockSockets {
                entries: Some(vec![]),
            },
        );

        let snapshot = collector.collect("alice").await.unwrap();
        assert!(snapshot.find(2).is_none());

        let shell = snapshot.find(3).unwrap();
        assert_eq!(shell.working_directory, "");
    }

    #[tokio::test]
    async fn test_partial_reads_use_defaults() {
        fn table() -> Result<Vec<RawProcess>> {
            let mut raw = RawProcess::new(42);
            raw.name = Some("locked".to_string());
            Ok(vec![raw])
        }

        let collector = SnapshotCollector::new(
            MockTable { result: table },
            MockSockets {
                entries: Some(vec![]),
            },
        );

        let snapshot = collector.collect("alice").await.unwrap();
        let record = snapshot.find(42).unwrap();
        assert_eq!(record.owner, UNKNOWN_OWNER);
        assert_eq!(record.classification, Classification::SystemOwned);
        assert_eq!(record.command_line, "");
        assert_eq!(record.cpu_percent, 0.0);
        assert_eq!(record.memory_bytes, 0);
        assert_eq!(record.app_type, AppType::Unknown);
    }

    #[tokio::test]
    async fn test_connection_failure_is_not_fatal() {
        let collector =
            SnapshotCollector::new(MockTable { result: table }, MockSockets { entries: None });

        let snapshot = collector.collect("alice").await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.records().iter().all(|r| r.connections.is_empty()));
    }

    #[tokio::test]
    async fn test_process_failure_is_collection_failed() {
        fn broken() -> Result<Vec<RawProcess>> {
            Err(Error::UnsupportedPlatform("plan9".to_string()))
        }

        let collector = SnapshotCollector::new(
            MockTable { result: broken },
            MockSockets {
                entries: Some(sockets()),
            },
        );

        let result = collector.collect("alice").await;
        assert!(matches!(result, Err(Error::CollectionFailed(_))));
    }

    #[test]
    fn test_group_by_pid_deduplicates() {
        let grouped = group_by_pid(vec![
            SocketEntry::new(1, 80, ConnectionState::Listening),
            SocketEntry::new(1, 80, ConnectionState::Listening),
            SocketEntry::new(1, 80, ConnectionState::Other),
        ]);
        assert_eq!(
            grouped[&1],
            vec![Connection::listening(80), Connection::other(80)]
        );
    }
}
