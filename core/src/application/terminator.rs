//! Batch termination service.

use tracing::{info, warn};

use crate::error::Error;
use crate::ports::ProcessKillerPort;

/// Outcome of one termination batch.
#[derive(Debug)]
pub struct TerminationSummary {
    /// Number of pids the batch was asked to terminate.
    pub requested: usize,
    /// Number of pids that were terminated.
    pub succeeded: usize,
    /// First failure in attempt order, if any.
    pub first_error: Option<Error>,
}

impl TerminationSummary {
    pub fn failed(&self) -> usize {
        self.requested - self.succeeded
    }

    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
    }

    /// One-line outcome suitable for a notification or terminal output.
    pub fn describe(&self) -> String {
        match &self.first_error {
            None => format!("Successfully killed {} process(es)", self.succeeded),
            Some(e) => format!(
                "Killed {} of {} process(es). Error: {}",
                self.succeeded, self.requested, e
            ),
        }
    }
}

/// Terminates batches of processes through a [`ProcessKillerPort`].
pub struct Terminator<K: ProcessKillerPort> {
    killer: K,
    force: bool,
}

impl<K: ProcessKillerPort> Terminator<K> {
    pub fn new(killer: K, force: bool) -> Self {
        Self { killer, force }
    }

    pub fn is_force(&self) -> bool {
        self.force
    }

    /// Attempt every pid in order; one failure never stops the batch.
    pub async fn terminate(&self, pids: &[u32]) -> TerminationSummary {
        let mut succeeded = 0;
        let mut first_error = None;

        for &pid in pids {
            match self.killer.kill(pid, self.force).await {
                Ok(()) => {
                    info!(pid = pid, force = self.force, "Terminated process");
                    succeeded += 1;
                }
                Err(e) => {
                    warn!(pid = pid, error = %e, "Failed to terminate process");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        TerminationSummary {
            requested: pids.len(),
            succeeded,
            first_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingKiller {
        failing: Vec<u32>,
        attempts: Mutex<Vec<(u32, bool)>>,
    }

    impl ProcessKillerPort for RecordingKiller {
        async fn kill(&self, pid: u32, force: bool) -> Result<()> {
            self.attempts.lock().push((pid, force));
            if self.failing.contains(&pid) {
                Err(Error::PermissionDenied(pid))
            } else {
                Ok(())
            }
        }

        fn is_running(&self, _pid: u32) -> bool {
            false
        }
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let killer = RecordingKiller {
            failing: vec![2],
            ..Default::default()
        };
        let terminator = Terminator::new(killer, false);

        let summary = tokio_test::block_on(terminator.terminate(&[1, 2, 3]));

        assert_eq!(summary.requested, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(summary.first_error, Some(Error::PermissionDenied(2))));
        assert_eq!(
            *terminator.killer.attempts.lock(),
            vec![(1, false), (2, false), (3, false)]
        );
    }

    #[test]
    fn test_first_error_is_kept() {
        let killer = RecordingKiller {
            failing: vec![5, 7],
            ..Default::default()
        };
        let terminator = Terminator::new(killer, true);

        let summary = tokio_test::block_on(terminator.terminate(&[5, 6, 7]));

        assert_eq!(summary.succeeded, 1);
        assert!(matches!(summary.first_error, Some(Error::PermissionDenied(5))));
        assert!(terminator
            .killer
            .attempts
            .lock()
            .iter()
            .all(|&(_, force)| force));
    }

    #[test]
    fn test_describe() {
        let ok = TerminationSummary {
            requested: 2,
            succeeded: 2,
            first_error: None,
        };
        assert!(ok.is_success());
        assert_eq!(ok.describe(), "Successfully killed 2 process(es)");

        let partial = TerminationSummary {
            requested: 3,
            succeeded: 2,
            first_error: Some(Error::ProcessNotFound(9)),
        };
        assert!(partial.describe().starts_with("Killed 2 of 3 process(es). Error:"));
        assert!(partial.describe().contains('9'));
    }

    #[test]
    fn test_empty_batch() {
        let terminator = Terminator::new(RecordingKiller::default(), false);
        let summary = tokio_test::block_on(terminator.terminate(&[]));
        assert_eq!(summary.requested, 0);
        assert!(summary.is_success());
    }
}
