//! Event Handling - Keyboard input processing

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::scene::PanelKind;

/// Actions that can be triggered by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Flip a panel's visibility
    Toggle(PanelKind),
    /// Submit the active panel (or run the heart check)
    Submit,
    /// Start/stop dictation in the voice panel
    ToggleRecording,
    /// Connect the health aggregator / refresh the summary
    ConnectHealth,
    /// Dismiss the error banner, or close the active panel
    Escape,
    /// Type into the active panel's text field
    Input(char),
    Backspace,
    None,
}

/// Whether the active panel owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Launcher keys are live
    Global,
    /// A text-entry panel is active; characters go to its field
    Typing,
}

/// Map a key event to an action
pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Action {
    // Ctrl+C quits from anywhere, even mid-typing.
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match mode {
        InputMode::Typing => match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => Action::ToggleRecording,
            (_, KeyCode::Esc) => Action::Escape,
            (_, KeyCode::Enter) => Action::Submit,
            (_, KeyCode::Backspace) => Action::Backspace,
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => Action::Input(c),
            _ => Action::None,
        },
        InputMode::Global => match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => Action::Quit,
            (KeyModifiers::NONE, KeyCode::Char('s')) => Action::Toggle(PanelKind::Schedule),
            (KeyModifiers::NONE, KeyCode::Char('w')) => Action::Toggle(PanelKind::Workout),
            (KeyModifiers::NONE, KeyCode::Char('d')) => Action::Toggle(PanelKind::Destressor),
            (KeyModifiers::NONE, KeyCode::Char('v')) => Action::Toggle(PanelKind::VoiceInput),
            (KeyModifiers::NONE, KeyCode::Char('h')) => Action::Toggle(PanelKind::HeartRisk),
            (KeyModifiers::NONE, KeyCode::Char('c')) => Action::ConnectHealth,
            (_, KeyCode::Enter) => Action::Submit,
            (_, KeyCode::Esc) => Action::Escape,
            _ => Action::None,
        },
    }
}

/// Poll for keyboard events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<KeyEvent>> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            return Ok(Some(key));
        }
    }
    Ok(None)
}
