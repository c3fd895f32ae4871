//! Input-routing modes.

/// Which sub-mode keystrokes are routed to.
///
/// Searching and confirming a kill are separate variants, so the session
/// can never be in both at once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation, selection, sorting and filtering.
    #[default]
    Normal,
    /// Editing the search text; `buffer` mirrors the live filter.
    Searching { buffer: String },
    /// Waiting for y/n on a captured list of pids.
    ConfirmingKill { targets: Vec<u32> },
}

impl InputMode {
    pub fn is_normal(&self) -> bool {
        matches!(self, InputMode::Normal)
    }

    pub fn is_searching(&self) -> bool {
        matches!(self, InputMode::Searching { .. })
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, InputMode::ConfirmingKill { .. })
    }

    /// Pids awaiting confirmation, empty outside `ConfirmingKill`.
    pub fn pending_targets(&self) -> &[u32] {
        match self {
            InputMode::ConfirmingKill { targets } => targets,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_targets() {
        assert!(InputMode::Normal.pending_targets().is_empty());
        let mode = InputMode::ConfirmingKill {
            targets: vec![3, 7],
        };
        assert!(mode.is_confirming());
        assert_eq!(mode.pending_targets(), &[3, 7]);
    }
}
