//! View parameters and row derivation.
//!
//! Rows are always recomputed from a snapshot plus the current
//! [`ViewParameters`]; nothing here keeps state between calls.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{AppType, Classification, ConnectionState, ProcessRecord, ProcessSnapshot};

// ============================================================================
// SortKey
// ============================================================================

/// Column the row list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Pid,
    Name,
    #[default]
    PortCount,
    Cpu,
    Memory,
}

impl SortKey {
    /// All sort keys in cycling order.
    pub const ALL: [SortKey; 5] = [
        SortKey::Pid,
        SortKey::Name,
        SortKey::PortCount,
        SortKey::Cpu,
        SortKey::Memory,
    ];

    /// The next key in cycling order, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortKey::Pid => "PID",
            SortKey::Name => "Name",
            SortKey::PortCount => "Ports",
            SortKey::Cpu => "CPU",
            SortKey::Memory => "Mem",
        }
    }

    /// Compare two records on this key alone, ascending.
    fn compare(&self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        match self {
            SortKey::Pid => a.pid.cmp(&b.pid),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::PortCount => a.port_count().cmp(&b.port_count()),
            SortKey::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            SortKey::Memory => a.memory_bytes.cmp(&b.memory_bytes),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// ViewParameters
// ============================================================================

/// User-controlled filter, sort, search and selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParameters {
    pub active_group: Classification,
    pub sort_key: SortKey,
    pub sort_descending: bool,
    pub ports_only: bool,
    pub search_text: String,
    /// Selected pids. Survives refreshes, re-sorts and filters that hide them.
    pub selection: BTreeSet<u32>,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            active_group: Classification::OwnedByCurrentUser,
            sort_key: SortKey::PortCount,
            sort_descending: true,
            ports_only: true,
            search_text: String::new(),
            selection: BTreeSet::new(),
        }
    }
}

impl ViewParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: Classification) -> Self {
        self.active_group = group;
        self
    }

    pub fn with_sort(mut self, key: SortKey, descending: bool) -> Self {
        self.sort_key = key;
        self.sort_descending = descending;
        self
    }

    pub fn with_ports_only(mut self, enabled: bool) -> Self {
        self.ports_only = enabled;
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn is_selected(&self, pid: u32) -> bool {
        self.selection.contains(&pid)
    }

    /// Add or remove a pid from the selection.
    pub fn toggle_selection(&mut self, pid: u32) {
        if !self.selection.remove(&pid) {
            self.selection.insert(pid);
        }
    }

    /// Whether a record passes the group, ports-only and search filters.
    pub fn matches(&self, record: &ProcessRecord) -> bool {
        if record.classification != self.active_group {
            return false;
        }
        if self.ports_only && !record.has_connections() {
            return false;
        }
        record.matches_search(&self.search_text)
    }

    /// Order two records by the sort key and direction.
    ///
    /// The direction applies to the key only; ties always fall back to
    /// ascending pid.
    pub fn compare(&self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        let primary = self.sort_key.compare(a, b);
        let primary = if self.sort_descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.pid.cmp(&b.pid))
    }
}

// ============================================================================
// Derived rows
// ============================================================================

/// One row of the process table, derived from a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow {
    pub pid: u32,
    pub name: String,
    /// Formatted port list, listening ports first.
    pub ports: String,
    pub port_count: usize,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub app_type: AppType,
    pub selected: bool,
}

impl ViewRow {
    fn from_record(record: &ProcessRecord, selected: bool) -> Self {
        Self {
            pid: record.pid,
            name: record.name.clone(),
            ports: format_ports(record),
            port_count: record.port_count(),
            cpu_percent: record.cpu_percent,
            memory_bytes: record.memory_bytes,
            app_type: record.app_type,
            selected,
        }
    }
}

/// Format a record's ports: every listening port, then every other one,
/// each in enumeration order and tagged with its state.
pub fn format_ports(record: &ProcessRecord) -> String {
    let listening = record
        .connections
        .iter()
        .filter(|c| c.state == ConnectionState::Listening);
    let other = record
        .connections
        .iter()
        .filter(|c| c.state != ConnectionState::Listening);

    listening
        .chain(other)
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Filter and sort a snapshot into display rows.
pub fn derive_rows(snapshot: &ProcessSnapshot, view: &ViewParameters) -> Vec<ViewRow> {
    let mut visible: Vec<&ProcessRecord> = snapshot
        .records()
        .iter()
        .filter(|r| view.matches(r))
        .collect();

    visible.sort_by(|a, b| view.compare(a, b));

    visible
        .into_iter()
        .map(|r| ViewRow::from_record(r, view.is_selected(r.pid)))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Connection;

    fn record(pid: u32, name: &str, connections: Vec<Connection>) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.to_string(),
            owner: "me".to_string(),
            working_directory: String::new(),
            command_line: String::new(),
            classification: Classification::OwnedByCurrentUser,
            app_type: AppType::Binary,
            connections,
            cpu_percent: 0.0,
            memory_bytes: 0,
        }
    }

    fn pids(rows: &[ViewRow]) -> Vec<u32> {
        rows.iter().map(|r| r.pid).collect()
    }

    #[test]
    fn test_sort_key_cycle() {
        assert_eq!(SortKey::Pid.next(), SortKey::Name);
        assert_eq!(SortKey::PortCount.next(), SortKey::Cpu);
        assert_eq!(SortKey::Memory.next(), SortKey::Pid);
    }

    #[test]
    fn test_default_view() {
        let view = ViewParameters::new();
        assert_eq!(view.active_group, Classification::OwnedByCurrentUser);
        assert_eq!(view.sort_key, SortKey::PortCount);
        assert!(view.sort_descending);
        assert!(view.ports_only);
        assert!(view.search_text.is_empty());
        assert!(view.selection.is_empty());
    }

    #[test]
    fn test_port_count_tie_breaks_on_pid() {
        let snapshot = ProcessSnapshot::captured_now(vec![
            record(5, "e", vec![]),
            record(2, "b", vec![]),
            record(9, "i", vec![
                Connection::listening(1),
                Connection::listening(2),
                Connection::other(3),
            ]),
        ]);
        let view = ViewParameters::new()
            .with_ports_only(false)
            .with_sort(SortKey::PortCount, false);

        assert_eq!(pids(&derive_rows(&snapshot, &view)), vec![2, 5, 9]);
    }

    #[test]
    fn test_descending_keeps_ascending_tie_break() {
        let snapshot = ProcessSnapshot::captured_now(vec![
            record(5, "e", vec![]),
            record(2, "b", vec![]),
            record(9, "i", vec![Connection::listening(80)]),
            record(7, "g", vec![Connection::listening(81)]),
        ]);
        let view = ViewParameters::new()
            .with_ports_only(false)
            .with_sort(SortKey::PortCount, true);

        assert_eq!(pids(&derive_rows(&snapshot, &view)), vec![7, 9, 2, 5]);
    }

    #[test]
    fn test_sort_by_name_cpu_memory() {
        let mut a = record(1, "zsh", vec![]);
        a.cpu_percent = 3.0;
        a.memory_bytes = 100;
        let mut b = record(2, "bash", vec![]);
        b.cpu_percent = 12.5;
        b.memory_bytes = 50;
        let mut c = record(3, "fish", vec![]);
        c.cpu_percent = 0.5;
        c.memory_bytes = 400;
        let snapshot = ProcessSnapshot::captured_now(vec![a, b, c]);
        let base = ViewParameters::new().with_ports_only(false);

        let by_name = base.clone().with_sort(SortKey::Name, false);
        assert_eq!(pids(&derive_rows(&snapshot, &by_name)), vec![2, 3, 1]);

        let by_cpu = base.clone().with_sort(SortKey::Cpu, true);
        assert_eq!(pids(&derive_rows(&snapshot, &by_cpu)), vec![2, 1, 3]);

        let by_mem = base.with_sort(SortKey::Memory, false);
        assert_eq!(pids(&derive_rows(&snapshot, &by_mem)), vec![2, 1, 3]);
    }

    #[test]
    fn test_filters_by_group() {
        let mut system = record(1, "sshd", vec![Connection::listening(22)]);
        system.classification = Classification::SystemOwned;
        let user = record(2, "node", vec![Connection::listening(3000)]);
        let snapshot = ProcessSnapshot::captured_now(vec![system, user]);

        let user_rows = derive_rows(&snapshot, &ViewParameters::new());
        assert_eq!(pids(&user_rows), vec![2]);

        let system_rows = derive_rows(
            &snapshot,
            &ViewParameters::new().with_group(Classification::SystemOwned),
        );
        assert_eq!(pids(&system_rows), vec![1]);
    }

    #[test]
    fn test_search_by_name_and_port() {
        let snapshot = ProcessSnapshot::captured_now(vec![
            record(1, "redis-server", vec![Connection::listening(6379)]),
            record(2, "postgres", vec![Connection::listening(5432)]),
        ]);

        let by_port = ViewParameters::new().with_search("379");
        assert_eq!(pids(&derive_rows(&snapshot, &by_port)), vec![1]);

        let by_name = ViewParameters::new().with_search("Redis");
        assert_eq!(pids(&derive_rows(&snapshot, &by_name)), vec![1]);

        let none = ViewParameters::new().with_search("6380");
        assert!(derive_rows(&snapshot, &none).is_empty());
    }

    #[test]
    fn test_format_ports_listening_first() {
        let r = record(
            1,
            "app",
            vec![
                Connection::other(50000),
                Connection::listening(8080),
                Connection::other(50001),
                Connection::listening(9090),
            ],
        );
        assert_eq!(format_ports(&r), "8080(L), 9090(L), 50000(E), 50001(E)");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let snapshot = ProcessSnapshot::captured_now(vec![
            record(3, "c", vec![Connection::listening(1)]),
            record(1, "a", vec![Connection::listening(2)]),
            record(2, "b", vec![]),
        ]);
        let mut view = ViewParameters::new().with_ports_only(false);
        view.toggle_selection(1);

        let first = derive_rows(&snapshot, &view);
        let second = derive_rows(&snapshot, &view);
        assert_eq!(first, second);
        assert!(first.iter().find(|r| r.pid == 1).unwrap().selected);
    }

    #[test]
    fn test_end_to_end_ports_only() {
        let snapshot = ProcessSnapshot::captured_now(vec![
            record(100, "worker", vec![]),
            record(200, "web", vec![Connection::listening(8080)]),
        ]);
        let mut view = ViewParameters::new();

        assert_eq!(pids(&derive_rows(&snapshot, &view)), vec![200]);

        view.ports_only = false;
        assert_eq!(pids(&derive_rows(&snapshot, &view)), vec![200, 100]);
    }
}
