//! Discrete user actions and the effects they request.

/// A named user action, already decoded from a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Flip between the user and system process tabs.
    SwitchGroup,
    /// Toggle the pid under the cursor in the selection set.
    ToggleSelection,
    /// Ask for confirmation to kill the selection (or the cursor row).
    InitiateKill,
    TogglePortsOnlyFilter,
    CycleSortKey,
    ToggleSortDirection,
    EnterSearchMode,
    /// Full replacement text of the search box after an edit.
    SearchTextChanged(String),
    /// Enter in the search box.
    SearchSubmit,
    /// Escape in the search box.
    SearchEscape,
    ConfirmKill,
    CancelKill,
    /// Request a collection outside the interval.
    Refresh,
    CursorUp,
    CursorDown,
    CursorTop,
    CursorBottom,
    PageUp,
    PageDown,
    /// Terminal resized; layout only.
    Resize { width: u16, height: u16 },
}

/// Side effect the session asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Terminate these pids, in order.
    Terminate(Vec<u32>),
    /// Start a collection.
    Refresh,
    /// End the session.
    Quit,
}
