//! Process and snapshot domain models.

use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ============================================================================
// Connection
// ============================================================================

/// Socket state as far as the dashboard cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    /// Bound and accepting (TCP `LISTEN`).
    Listening,
    /// Anything else: established, closing, UDP sockets, ...
    Other,
}

impl ConnectionState {
    /// Map a raw socket state string (`LISTEN`, `ESTAB`, `UNCONN`, ...).
    pub fn from_raw(state: &str) -> Self {
        if state.eq_ignore_ascii_case("LISTEN") {
            ConnectionState::Listening
        } else {
            ConnectionState::Other
        }
    }

    /// Short label used in port lists: `L` or `E`.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Listening => "L",
            ConnectionState::Other => "E",
        }
    }
}

/// A local port bound by a process at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub port: u16,
    pub state: ConnectionState,
}

impl Connection {
    pub fn new(port: u16, state: ConnectionState) -> Self {
        Self { port, state }
    }

    pub fn listening(port: u16) -> Self {
        Self::new(port, ConnectionState::Listening)
    }

    pub fn other(port: u16) -> Self {
        Self::new(port, ConnectionState::Other)
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.port, self.state.label())
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Which tab a process belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    /// Owner matches the invoking user.
    #[default]
    OwnedByCurrentUser,
    /// Every other owner, including unreadable ones.
    SystemOwned,
}

impl Classification {
    /// Classify an owner name against the invoking user's name.
    ///
    /// The comparison is exact and case-sensitive.
    pub fn classify(owner: &str, current_user: &str) -> Self {
        if owner == current_user {
            Classification::OwnedByCurrentUser
        } else {
            Classification::SystemOwned
        }
    }

    /// The other group, used when switching tabs.
    pub fn toggled(&self) -> Self {
        match self {
            Classification::OwnedByCurrentUser => Classification::SystemOwned,
            Classification::SystemOwned => Classification::OwnedByCurrentUser,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Classification::OwnedByCurrentUser => "User Processes",
            Classification::SystemOwned => "System Processes",
        }
    }
}

// ============================================================================
// AppType
// ============================================================================

/// Advisory label describing what kind of program a process is.
///
/// Only used for display; never consulted by filtering or sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AppType {
    GuiApp,
    DevTool,
    Binary,
    #[default]
    Unknown,
}

/// Roots under which application bundles live.
const APPLICATION_ROOTS: &[&str] = &["/Applications", "/System/Applications"];

/// Program + subcommand pairs that indicate a development server or build.
const DEV_INVOCATIONS: &[(&str, &str)] = &[
    ("go", "run"),
    ("cargo", "run"),
    ("cargo", "watch"),
    ("npm", "run"),
    ("npm", "start"),
    ("yarn", "dev"),
    ("yarn", "start"),
    ("pnpm", "dev"),
    ("pnpm", "run"),
    ("bun", "run"),
    ("deno", "run"),
    ("rails", "server"),
    ("mix", "phx.server"),
    ("dotnet", "run"),
];

/// Programs that are development servers on their own.
const DEV_SERVERS: &[&str] = &[
    "vite", "webpack", "nodemon", "next", "nuxt", "esbuild", "uvicorn", "gunicorn", "flask",
];

impl AppType {
    /// Best-effort label from the process name, working directory and command line.
    pub fn detect(name: &str, working_directory: &str, command_line: &str) -> Self {
        if APPLICATION_ROOTS
            .iter()
            .any(|root| working_directory.starts_with(root))
            || name.ends_with(".app")
        {
            return AppType::GuiApp;
        }

        if is_dev_invocation(command_line) || has_apps_basename(working_directory) {
            return AppType::DevTool;
        }

        if working_directory.is_empty() && command_line.is_empty() {
            return AppType::Unknown;
        }

        AppType::Binary
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AppType::GuiApp => "GUI App",
            AppType::DevTool => "Dev Tool",
            AppType::Binary => "Binary",
            AppType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for AppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn program_name(token: &str) -> &str {
    Path::new(token)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(token)
}

fn is_dev_invocation(command_line: &str) -> bool {
    let tokens: Vec<&str> = command_line.split_whitespace().collect();

    if tokens
        .iter()
        .any(|t| DEV_SERVERS.contains(&program_name(t)))
    {
        return true;
    }

    tokens.windows(2).any(|pair| {
        let program = program_name(pair[0]);
        DEV_INVOCATIONS
            .iter()
            .any(|(p, sub)| *p == program && *sub == pair[1])
    })
}

fn has_apps_basename(working_directory: &str) -> bool {
    if working_directory.is_empty() {
        return false;
    }
    Path::new(working_directory)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|base| base.starts_with("apps"))
}

// ============================================================================
// ProcessRecord
// ============================================================================

/// One OS process at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub owner: String,
    pub working_directory: String,
    pub command_line: String,
    pub classification: Classification,
    pub app_type: AppType,
    /// Sockets bound by this pid, in enumeration order.
    pub connections: Vec<Connection>,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
}

impl ProcessRecord {
    /// Number of observed connections.
    pub fn port_count(&self) -> usize {
        self.connections.len()
    }

    pub fn has_connections(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Case-insensitive match against the name and each port's decimal form.
    ///
    /// An empty query matches everything.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_lowercase();
        self.name.to_lowercase().contains(&query_lower)
            || self
                .connections
                .iter()
                .any(|c| c.port.to_string().contains(&query_lower))
    }
}

// ============================================================================
// ProcessSnapshot
// ============================================================================

/// Every process observed by one collector run.
///
/// Immutable once built; the session replaces it wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSnapshot {
    records: Vec<ProcessRecord>,
    captured_at: DateTime<Local>,
}

impl ProcessSnapshot {
    pub fn new(records: Vec<ProcessRecord>, captured_at: DateTime<Local>) -> Self {
        Self {
            records,
            captured_at,
        }
    }

    /// Snapshot stamped with the current local time.
    pub fn captured_now(records: Vec<ProcessRecord>) -> Self {
        Self::new(records, Local::now())
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    /// Look up a record by pid.
    pub fn find(&self, pid: u32) -> Option<&ProcessRecord> {
        self.records.iter().find(|r| r.pid == pid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, connections: Vec<Connection>) -> ProcessRecord {
        ProcessRecord {
            pid: 1,
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

    #[test]
    fn test_connection_state_from_raw() {
        assert_eq!(ConnectionState::from_raw("LISTEN"), ConnectionState::Listening);
        assert_eq!(ConnectionState::from_raw("listen"), ConnectionState::Listening);
        assert_eq!(ConnectionState::from_raw("ESTAB"), ConnectionState::Other);
        assert_eq!(ConnectionState::from_raw("UNCONN"), ConnectionState::Other);
    }

    #[test]
    fn test_connection_display() {
        assert_eq!(Connection::listening(8080).to_string(), "8080(L)");
        assert_eq!(Connection::other(443).to_string(), "443(E)");
    }

    #[test]
    fn test_classify_is_exact() {
        assert_eq!(
            Classification::classify("alice", "alice"),
            Classification::OwnedByCurrentUser
        );
        assert_eq!(
            Classification::classify("Alice", "alice"),
            Classification::SystemOwned
        );
        assert_eq!(
            Classification::classify("unknown", "alice"),
            Classification::SystemOwned
        );
    }

    #[test]
    fn test_classification_toggled() {
        assert_eq!(
            Classification::OwnedByCurrentUser.toggled(),
            Classification::SystemOwned
        );
        assert_eq!(
            Classification::SystemOwned.toggled(),
            Classification::OwnedByCurrentUser
        );
    }

    #[test]
    fn test_detect_gui_app() {
        assert_eq!(
            AppType::detect("Finder", "/Applications/Finder.app", ""),
            AppType::GuiApp
        );
        assert_eq!(AppType::detect("Safari.app", "/", "safari"), AppType::GuiApp);
    }

    #[test]
    fn test_detect_dev_tool() {
        assert_eq!(
            AppType::detect("main", "/home/me/src/api", "/usr/local/go/bin/go run ./cmd/api"),
            AppType::DevTool
        );
        assert_eq!(
            AppType::detect("node", "/home/me/web", "node /home/me/web/node_modules/.bin/vite"),
            AppType::DevTool
        );
        assert_eq!(
            AppType::detect("server", "/home/me/apps-backend", "./server"),
            AppType::DevTool
        );
    }

    #[test]
    fn test_detect_binary_and_unknown() {
        assert_eq!(
            AppType::detect("nginx", "/", "nginx: master process"),
            AppType::Binary
        );
        assert_eq!(AppType::detect("kworker/0:1", "", ""), AppType::Unknown);
    }

    #[test]
    fn test_go_without_run_is_not_dev_tool() {
        assert_eq!(
            AppType::detect("gopls", "/home/me", "gopls serve"),
            AppType::Binary
        );
    }

    #[test]
    fn test_matches_search() {
        let redis = record("redis-server", vec![Connection::listening(6379)]);
        assert!(redis.matches_search("379"));
        assert!(redis.matches_search("redis"));
        assert!(redis.matches_search("REDIS"));
        assert!(redis.matches_search(""));
        assert!(!redis.matches_search("6380"));
    }

    #[test]
    fn test_snapshot_find() {
        let mut a = record("a", vec![]);
        a.pid = 10;
        let mut b = record("b", vec![]);
        b.pid = 20;
        let snapshot = ProcessSnapshot::captured_now(vec![a, b]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.find(20).map(|r| r.name.as_str()), Some("b"));
        assert!(snapshot.find(30).is_none());
    }
}
