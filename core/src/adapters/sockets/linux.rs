//! Linux socket scanner implementation using ss.

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::domain::ConnectionState;
use crate::error::{Error, Result};
use crate::ports::SocketEntry;

use super::utils::Utils;
use super::Scanner;

const SS_CANDIDATES: &[&str] = &["/usr/sbin/ss", "/usr/bin/ss", "/sbin/ss", "/bin/ss"];

/// Matches one `("name",pid=123,fd=4)` owner inside the process column.
static OWNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\("(?:[^"]*)",pid=(\d+),fd=\d+\)"#).expect("valid regex"));

/// Linux-specific socket scanner.
pub struct LinuxScanner;

impl LinuxScanner {
    /// Create a new Linux scanner.
    pub fn new() -> Self {
        Self
    }

    /// Parse raw ss output. Only the pid and port columns matter, so
    /// undecodable process names are replaced rather than rejected.
    fn parse_ss_bytes(&self, raw: &[u8]) -> Vec<SocketEntry> {
        self.parse_ss_output(&String::from_utf8_lossy(raw))
    }

    /// Parse ss output into socket entries.
    ///
    /// Expected ss output format (`-H`, TCP and UDP together):
    /// ```text
    /// tcp   LISTEN 0      4096       127.0.0.1:631        0.0.0.0:*    users:(("cupsd",pid=1234,fd=7))
    /// udp   UNCONN 0      0            0.0.0.0:5353       0.0.0.0:*    users:(("avahi-daemon",pid=800,fd=12))
    /// ```
    ///
    /// Sockets shared by several processes list every owner; each owner gets
    /// its own entry. Lines without a process column (sockets we may not
    /// inspect) are skipped.
    fn parse_ss_output(&self, output: &str) -> Vec<SocketEntry> {
        let mut entries = Vec::new();
        let mut seen: HashSet<SocketEntry> = HashSet::new();

        for line in output.lines() {
            if line.trim().is_empty() {
                continue;
            }

            // Parse columns: [Netid] [State] [Recv-Q] [Send-Q] [Local Address:Port] [Peer Address:Port] [Process]
            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 7 {
                continue;
            }

            let state = ConnectionState::from_raw(components[1]);

            let Some(port) = Utils::local_port(components[4]) else {
                continue;
            };

            let process_column = components[6..].join(" ");
            for caps in OWNER_RE.captures_iter(&process_column) {
                let pid: u32 = match caps[1].parse() {
                    Ok(p) => p,
                    Err(_) => continue,
                };

                // Deduplicate by (pid, port, state)
                let entry = SocketEntry::new(pid, port, state);
                if seen.insert(entry) {
                    entries.push(entry);
                }
            }
        }

        entries
    }
}

impl Default for LinuxScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for LinuxScanner {
    /// Enumerate all TCP and UDP sockets.
    ///
    /// Executes: `ss -Htunap`
    ///
    /// Flags explained:
    /// -H, --no-header     Suppress header line
    /// -t, --tcp           display TCP sockets
    /// -u, --udp           display UDP sockets
    /// -n, --numeric       don't resolve service names
    /// -a, --all           display listening and non-listening sockets
    /// -p, --processes     show process using socket
    async fn scan(&self) -> Result<Vec<SocketEntry>> {
        let ss = Utils::resolve_binary(SS_CANDIDATES, "ss");
        let output = Command::new(&ss)
            .args(["-Htunap"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run ss: {}", e)))?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "ss exited with {}",
                output.status
            )));
        }

        let entries = self.parse_ss_bytes(&output.stdout);
        debug!(count = entries.len(), "Parsed ss output");
        Ok(entries)
    }
}
