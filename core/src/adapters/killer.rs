//! Signal-based process killer.
//!
//! Uses the following strategy:
//! - force: SIGKILL immediately
//! - graceful: SIGTERM, poll until the grace period ends, then SIGKILL

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ports::ProcessKillerPort;

/// Grace period to wait between SIGTERM and SIGKILL (500ms)
pub const GRACEFUL_KILL_TIMEOUT_MS: u64 = 500;

/// How often to check whether a signalled process has exited.
const POLL_INTERVAL_MS: u64 = 50;

/// Process killer that delivers OS signals.
#[derive(Debug, Clone)]
pub struct SignalKiller {
    grace_period: Duration,
}

impl SignalKiller {
    /// Create a killer with the default grace period.
    pub fn new() -> Self {
        Self::with_grace_period(Duration::from_millis(GRACEFUL_KILL_TIMEOUT_MS))
    }

    /// Create a killer with a custom SIGTERM to SIGKILL grace period.
    pub fn with_grace_period(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// Refuse pids that would signal something other than one process.
    fn check_target(pid: u32) -> Result<()> {
        if pid == 0 {
            return Err(Error::KillFailed {
                pid,
                reason: "refusing to signal pid 0".to_string(),
            });
        }
        if pid == std::process::id() {
            return Err(Error::KillFailed {
                pid,
                reason: "refusing to kill portscope itself".to_string(),
            });
        }
        Ok(())
    }

    async fn wait_for_exit(&self, pid: u32) -> bool {
        let deadline = Instant::now() + self.grace_period;
        while Instant::now() < deadline {
            if !self.is_running(pid) {
                return true;
            }
            sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
        !self.is_running(pid)
    }
}

impl Default for SignalKiller {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessKillerPort for SignalKiller {
    async fn kill(&self, pid: u32, force: bool) -> Result<()> {
        Self::check_target(pid)?;

        if force {
            debug!(pid = pid, "Sending SIGKILL");
            return platform::force_kill(pid);
        }

        debug!(pid = pid, "Attempting graceful kill");
        platform::terminate(pid)?;

        if self.wait_for_exit(pid).await {
            debug!(pid = pid, "Process terminated after SIGTERM");
            return Ok(());
        }

        warn!(pid = pid, "Process survived SIGTERM, sending SIGKILL");
        match platform::force_kill(pid) {
            // Exited between the last poll and SIGKILL
            Err(Error::ProcessNotFound(_)) => Ok(()),
            other => other,
        }
    }

    fn is_running(&self, pid: u32) -> bool {
        platform::is_running(pid)
    }
}

#[cfg(unix)]
mod platform {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    use crate::error::{Error, Result};

    fn target(pid: u32) -> Result<Pid> {
        i32::try_from(pid)
            .map(Pid::from_raw)
            .map_err(|_| Error::ProcessNotFound(pid))
    }

    fn send(pid: u32, signal: Signal) -> Result<()> {
        match kill(target(pid)?, signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(Error::ProcessNotFound(pid)),
            Err(Errno::EPERM) => Err(Error::PermissionDenied(pid)),
            Err(e) => Err(Error::KillFailed {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    pub fn terminate(pid: u32) -> Result<()> {
        send(pid, Signal::SIGTERM)
    }

    pub fn force_kill(pid: u32) -> Result<()> {
        send(pid, Signal::SIGKILL)
    }

    pub fn is_running(pid: u32) -> bool {
        let Ok(target) = target(pid) else {
            return false;
        };
        // Signal 0 probes for existence; EPERM means it exists but isn't ours.
        matches!(kill(target, None), Ok(()) | Err(Errno::EPERM))
    }
}

#[cfg(not(unix))]
mod platform {
    use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

    use crate::error::{Error, Result};

    fn with_process<T>(pid: u32, f: impl FnOnce(&sysinfo::Process) -> T) -> Option<T> {
        let target = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
        system.process(target).map(f)
    }

    fn send(pid: u32, signal: Signal) -> Result<()> {
        let delivered = with_process(pid, |p| p.kill_with(signal).unwrap_or_else(|| p.kill()))
            .ok_or(Error::ProcessNotFound(pid))?;
        if delivered {
            Ok(())
        } else {
            Err(Error::KillFailed {
                pid,
                reason: "signal was not delivered".to_string(),
            })
        }
    }

    pub fn terminate(pid: u32) -> Result<()> {
        send(pid, Signal::Term)
    }

    pub fn force_kill(pid: u32) -> Result<()> {
        send(pid, Signal::Kill)
    }

    pub fn is_running(pid: u32) -> bool {
        with_process(pid, |_| ()).is_some()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    #[tokio::test]
    async fn test_kill_missing_process_is_an_error() {
        let killer = SignalKiller::with_grace_period(Duration::from_millis(50));
        // Far above pid_max on Linux and macOS
        let result = killer.kill(i32::MAX as u32, true).await;
        assert!(matches!(result, Err(Error::ProcessNotFound(_))));
    }

    #[tokio::test]
    async fn test_refuses_pid_zero_and_self() {
        let killer = SignalKiller::new();
        assert!(matches!(
            killer.kill(0, true).await,
            Err(Error::KillFailed { pid: 0, .. })
        ));
        assert!(matches!(
            killer.kill(std::process::id(), true).await,
            Err(Error::KillFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_graceful_kill_terminates_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        let killer = SignalKiller::with_grace_period(Duration::from_millis(500));

        killer.kill(pid, false).await.unwrap();
        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[test]
    fn test_kill_error_display() {
        let err = Error::ProcessNotFound(1234);
        assert!(err.to_string().contains("1234"));

        let err = Error::PermissionDenied(5678);
        assert!(err.to_string().contains("5678"));
    }
}
