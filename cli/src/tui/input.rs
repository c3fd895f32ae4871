//! Key bindings.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use portscope_core::{Action, InputMode};

/// Translate a terminal event into an action for the current mode.
pub fn map_event(event: &Event, mode: &InputMode) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key, mode),
        Event::Resize(width, height) => Some(Action::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

fn map_key(key: &KeyEvent, mode: &InputMode) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    match mode {
        InputMode::Normal => map_normal(key),
        InputMode::Searching { buffer } => map_search(key, buffer),
        InputMode::ConfirmingKill { .. } => map_confirm(key),
    }
}

fn map_normal(key: &KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab | KeyCode::BackTab => Action::SwitchGroup,
        KeyCode::Char(' ') => Action::ToggleSelection,
        KeyCode::Char('k') => Action::InitiateKill,
        KeyCode::Char('f') => Action::TogglePortsOnlyFilter,
        KeyCode::Char('s') => Action::CycleSortKey,
        KeyCode::Char('o') => Action::ToggleSortDirection,
        KeyCode::Char('/') => Action::EnterSearchMode,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Up => Action::CursorUp,
        KeyCode::Down => Action::CursorDown,
        KeyCode::Home | KeyCode::Char('g') => Action::CursorTop,
        KeyCode::End | KeyCode::Char('G') => Action::CursorBottom,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => return None,
    };
    Some(action)
}

fn map_search(key: &KeyEvent, buffer: &str) -> Option<Action> {
    match key.code {
        KeyCode::Enter => Some(Action::SearchSubmit),
        KeyCode::Esc => Some(Action::SearchEscape),
        KeyCode::Backspace => {
            let mut text = buffer.to_string();
            text.pop()?;
            Some(Action::SearchTextChanged(text))
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut text = buffer.to_string();
            text.push(c);
            Some(Action::SearchTextChanged(text))
        }
        _ => None,
    }
}

fn map_confirm(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::ConfirmKill),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::CancelKill),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn searching(buffer: &str) -> InputMode {
        InputMode::Searching {
            buffer: buffer.to_string(),
        }
    }

    #[test]
    fn test_normal_bindings() {
        let mode = InputMode::Normal;
        assert_eq!(map_event(&press(KeyCode::Tab), &mode), Some(Action::SwitchGroup));
        assert_eq!(map_event(&press(KeyCode::Char('k')), &mode), Some(Action::InitiateKill));
        assert_eq!(map_event(&press(KeyCode::Char('/')), &mode), Some(Action::EnterSearchMode));
        assert_eq!(map_event(&press(KeyCode::Char('q')), &mode), Some(Action::Quit));
        assert_eq!(map_event(&press(KeyCode::Char('y')), &mode), None);
    }

    #[test]
    fn test_cursor_keys() {
        let mode = InputMode::Normal;
        assert_eq!(map_event(&press(KeyCode::Up), &mode), Some(Action::CursorUp));
        assert_eq!(map_event(&press(KeyCode::Down), &mode), Some(Action::CursorDown));
        assert_eq!(map_event(&press(KeyCode::Char('j')), &mode), None);
        assert_eq!(map_event(&press(KeyCode::PageDown), &mode), Some(Action::PageDown));
    }

    #[test]
    fn test_search_edits_buffer() {
        assert_eq!(
            map_event(&press(KeyCode::Char('q')), &searching("redi")),
            Some(Action::SearchTextChanged("rediq".to_string()))
        );
        assert_eq!(
            map_event(&press(KeyCode::Backspace), &searching("80")),
            Some(Action::SearchTextChanged("8".to_string()))
        );
        assert_eq!(map_event(&press(KeyCode::Backspace), &searching("")), None);
        assert_eq!(map_event(&press(KeyCode::Esc), &searching("x")), Some(Action::SearchEscape));
    }

    #[test]
    fn test_confirm_bindings() {
        let mode = InputMode::ConfirmingKill { targets: vec![1] };
        assert_eq!(map_event(&press(KeyCode::Char('y')), &mode), Some(Action::ConfirmKill));
        assert_eq!(map_event(&press(KeyCode::Esc), &mode), Some(Action::CancelKill));
        assert_eq!(map_event(&press(KeyCode::Char(' ')), &mode), None);
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c, &searching("abc")), Some(Action::Quit));
        assert_eq!(
            map_event(&ctrl_c, &InputMode::ConfirmingKill { targets: vec![] }),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_event(&Event::Key(key), &InputMode::Normal), None);
    }
}
