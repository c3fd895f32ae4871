//! macOS socket scanner implementation using lsof.

use std::collections::HashSet;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::domain::ConnectionState;
use crate::error::{Error, Result};
use crate::ports::SocketEntry;

use super::utils::Utils;
use super::Scanner;

/// macOS-specific socket scanner using lsof.
pub struct DarwinScanner;

impl DarwinScanner {
    /// Create a new macOS scanner.
    pub fn new() -> Self {
        Self
    }

    /// Parse raw lsof output, replacing undecodable command names.
    fn parse_lsof_bytes(&self, raw: &[u8]) -> Vec<SocketEntry> {
        self.parse_lsof_output(&String::from_utf8_lossy(raw))
    }

    /// Parse lsof output into socket entries.
    ///
    /// Expected lsof output format:
    /// ```text
    /// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
    /// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
    /// Safari     612  code   30u  IPv4 0x1234567890abcdef      0t0  TCP 10.0.0.2:50000->1.1.1.1:443 (ESTABLISHED)
    /// mDNSRespo  200 _mdns    8u  IPv4 0xfedcba0987654321      0t0  UDP *:5353
    /// ```
    fn parse_lsof_output(&self, output: &str) -> Vec<SocketEntry> {
        let mut entries = Vec::new();
        let mut seen: HashSet<SocketEntry> = HashSet::new();

        // Skip header line
        for line in output.lines().skip(1) {
            if line.is_empty() {
                continue;
            }

            // Parse lsof columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME [STATE]
            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 9 {
                continue;
            }

            // Parse PID
            let pid: u32 = match components[1].parse() {
                Ok(p) => p,
                Err(_) => continue,
            };

            // Find the NAME column (address:port)
            // Search backwards for a component with ":" that isn't a device ID
            let mut address_part = "";
            for comp in components[8..].iter().rev() {
                if comp.contains(':') && !comp.starts_with("0x") && !comp.starts_with("0t") {
                    address_part = comp;
                    break;
                }
            }

            let Some(port) = Utils::local_port(address_part) else {
                continue;
            };

            // UDP sockets carry no state column
            let state = components
                .last()
                .and_then(|s| s.strip_prefix('('))
                .and_then(|s| s.strip_suffix(')'))
                .map(ConnectionState::from_raw)
                .unwrap_or(ConnectionState::Other);

            // Deduplicate by (pid, port, state)
            let entry = SocketEntry::new(pid, port, state);
            if seen.insert(entry) {
                entries.push(entry);
            }
        }

        entries
    }
}

impl Default for DarwinScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for DarwinScanner {
    /// Enumerate all internet sockets using lsof.
    ///
    /// Executes: `lsof -i -P -n +c 0`
    ///
    /// Flags explained:
    /// - -i: Show all internet (IPv4/IPv6, TCP/UDP) sockets
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - +c 0: Show full command name (unlimited length)
    async fn scan(&self) -> Result<Vec<SocketEntry>> {
        let output = Command::new("/usr/sbin/lsof")
            .args(["-i", "-P", "-n", "+c", "0"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run lsof: {}", e)))?;

        // lsof exits with 1 when it finds nothing; stdout is still authoritative.
        let entries = self.parse_lsof_bytes(&output.stdout);
        debug!(count = entries.len(), "Parsed lsof output");
        Ok(entries)
    }
}
