//! The session state machine.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::application::TerminationSummary;
use crate::domain::{derive_rows, ProcessRecord, ProcessSnapshot, ViewParameters, ViewRow};
use crate::error::Result;

use super::{Action, Command, InputMode, Notification, DEFAULT_NOTIFICATION_TTL};

/// Rows moved by `PageUp` / `PageDown`.
pub const PAGE_SIZE: usize = 10;

/// Everything the dashboard shows, plus the rules for changing it.
#[derive(Debug)]
pub struct Session {
    snapshot: Option<ProcessSnapshot>,
    view: ViewParameters,
    mode: InputMode,

    // Derived from (snapshot, view) after every change
    rows: Vec<ViewRow>,
    cursor: Option<usize>,

    notification: Option<Notification>,
    notification_ttl: Duration,
    is_loading: bool,
    error: Option<String>,
    spinner_frame: usize,
}

impl Session {
    pub fn new(view: ViewParameters) -> Self {
        Self {
            snapshot: None,
            view,
            mode: InputMode::Normal,
            rows: Vec::new(),
            cursor: None,
            notification: None,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            is_loading: false,
            error: None,
            spinner_frame: 0,
        }
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }

    // MARK: - Accessors

    pub fn view(&self) -> &ViewParameters {
        &self.view
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn snapshot(&self) -> Option<&ProcessSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn rows(&self) -> &[ViewRow] {
        &self.rows
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn cursor_row(&self) -> Option<&ViewRow> {
        self.cursor.and_then(|idx| self.rows.get(idx))
    }

    /// Full record for the row under the cursor.
    pub fn cursor_record(&self) -> Option<&ProcessRecord> {
        let pid = self.cursor_row()?.pid;
        self.snapshot.as_ref()?.find(pid)
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.text())
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Last collection failure, if the most recent collection failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    /// "Are you sure" prompt while confirming a kill.
    pub fn confirmation_prompt(&self) -> Option<String> {
        match &self.mode {
            InputMode::ConfirmingKill { targets } => Some(format!(
                "Are you sure you want to kill {} process(es)? (y/n)",
                targets.len()
            )),
            _ => None,
        }
    }

    /// Sort, filter and search summary for the status line.
    pub fn status_line(&self) -> String {
        let direction = if self.view.sort_descending {
            "DESC"
        } else {
            "ASC"
        };
        let filter = if self.view.ports_only {
            "Ports Only"
        } else {
            "All"
        };

        let mut line = format!(
            "Sort: {} ({}) | Filter: {}",
            self.view.sort_key.display_name(),
            direction,
            filter
        );
        if !self.view.search_text.is_empty() {
            line.push_str(&format!(" | Search: {}", self.view.search_text));
        }
        if let Some(snapshot) = &self.snapshot {
            line.push_str(&format!(
                " | Updated {}",
                snapshot.captured_at().format("%H:%M:%S")
            ));
        }
        line
    }

    // MARK: - Actions

    /// Apply one user action. Actions that do not apply to the current
    /// mode are ignored.
    pub fn handle(&mut self, action: Action) -> Option<Command> {
        if action == Action::Quit {
            return Some(Command::Quit);
        }

        match std::mem::take(&mut self.mode) {
            InputMode::Normal => self.handle_normal(action),
            InputMode::Searching { buffer } => self.handle_searching(buffer, action),
            InputMode::ConfirmingKill { targets } => self.handle_confirming(targets, action),
        }
    }

    fn handle_normal(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::SwitchGroup => {
                self.view.active_group = self.view.active_group.toggled();
                self.cursor = None;
                self.rederive();
            }
            Action::ToggleSelection => {
                if let Some(pid) = self.cursor_row().map(|row| row.pid) {
                    self.view.toggle_selection(pid);
                    self.rederive();
                }
            }
            Action::InitiateKill => self.initiate_kill(),
            Action::TogglePortsOnlyFilter => {
                self.view.ports_only = !self.view.ports_only;
                self.rederive();
            }
            Action::CycleSortKey => {
                self.view.sort_key = self.view.sort_key.next();
                self.rederive();
            }
            Action::ToggleSortDirection => {
                self.view.sort_descending = !self.view.sort_descending;
                self.rederive();
            }
            Action::EnterSearchMode => {
                self.mode = InputMode::Searching {
                    buffer: self.view.search_text.clone(),
                };
            }
            Action::Refresh => return Some(Command::Refresh),
            Action::CursorUp => self.move_cursor(-1),
            Action::CursorDown => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-(PAGE_SIZE as isize)),
            Action::PageDown => self.move_cursor(PAGE_SIZE as isize),
            Action::CursorTop => self.move_cursor(isize::MIN),
            Action::CursorBottom => self.move_cursor(isize::MAX),
            _ => {}
        }
        None
    }

    fn handle_searching(&mut self, buffer: String, action: Action) -> Option<Command> {
        match action {
            Action::SearchTextChanged(text) => {
                self.view.search_text = text.clone();
                self.mode = InputMode::Searching { buffer: text };
                self.rederive();
            }
            // Both leave the typed text active as the filter
            Action::SearchSubmit | Action::SearchEscape => {
                debug!(search = %self.view.search_text, "Search committed");
            }
            _ => self.mode = InputMode::Searching { buffer },
        }
        None
    }

    fn handle_confirming(&mut self, targets: Vec<u32>, action: Action) -> Option<Command> {
        match action {
            Action::ConfirmKill => {
                info!(count = targets.len(), "Kill confirmed");
                self.notify(format!("Killing {} process(es)...", targets.len()));
                Some(Command::Terminate(targets))
            }
            Action::CancelKill => {
                self.notify("Cancelled.");
                None
            }
            _ => {
                self.mode = InputMode::ConfirmingKill { targets };
                None
            }
        }
    }

    fn initiate_kill(&mut self) {
        let targets: Vec<u32> = if self.view.selection.is_empty() {
            self.cursor_row().map(|row| row.pid).into_iter().collect()
        } else {
            self.view.selection.iter().copied().collect()
        };

        if targets.is_empty() {
            self.notify("No process selected.");
            return;
        }

        self.mode = InputMode::ConfirmingKill { targets };
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.cursor = None;
            return;
        }

        let last = self.rows.len() - 1;
        let current = self.cursor.unwrap_or(0);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as usize).min(last)
        };
        self.cursor = Some(next);
    }

    // MARK: - Background results

    /// Mark a collection as outstanding.
    pub fn begin_collection(&mut self) {
        self.is_loading = true;
    }

    /// Replace the snapshot with a collection result.
    ///
    /// A failed collection keeps the previous snapshot but hides it
    /// behind the error until a later collection succeeds.
    pub fn apply_snapshot(&mut self, result: Result<ProcessSnapshot>) {
        self.is_loading = false;
        match result {
            Ok(snapshot) => {
                debug!(records = snapshot.len(), "Applying snapshot");
                self.snapshot = Some(snapshot);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
        self.rederive();
    }

    /// Report a finished kill batch and clear the selection.
    pub fn apply_termination(&mut self, summary: TerminationSummary) {
        self.notify(summary.describe());
        self.view.selection.clear();
        self.rederive();
    }

    /// Periodic housekeeping: advance the spinner and drop an expired
    /// notification.
    pub fn tick(&mut self, now: Instant) {
        if self.is_loading {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
        self.expire_notification(now);
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.is_expired(now))
        {
            self.notification = None;
        }
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notification = Some(Notification::new(text, self.notification_ttl));
    }

    /// Recompute rows and clamp the cursor into the new row list.
    fn rederive(&mut self) {
        self.rows = match &self.snapshot {
            Some(snapshot) => derive_rows(snapshot, &self.view),
            None => Vec::new(),
        };

        self.cursor = if self.rows.is_empty() {
            None
        } else {
            Some(self.cursor.unwrap_or(0).min(self.rows.len() - 1))
        };
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ViewParameters::default())
    }
}
