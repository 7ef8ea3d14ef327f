//! Input handling for the settings panel.
//!
//! Translates key events into [`PanelCommand`]s according to the panel's
//! current mode and implements [`InputHandler`] for [`SettingsPanel`].

use super::state::{Mode, PanelCommand, SettingsPanel};
use crate::input::handler::{is_key, is_key_with_ctrl, InputContext, InputHandler, InputResult};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Plain character input (no Ctrl/Alt)
fn typed_char(event: &KeyEvent) -> Option<char> {
    match event.code {
        KeyCode::Char(c)
            if !event
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}

/// Map a key to a command for `mode`; `None` when the key means nothing there
pub fn command_for(mode: &Mode, event: &KeyEvent) -> Option<PanelCommand> {
    use PanelCommand as C;

    match mode {
        Mode::Browsing => {
            if is_key_with_ctrl(event, KeyCode::Char('s')) {
                return Some(C::SaveAll);
            }
            if is_key_with_ctrl(event, KeyCode::Char('r')) {
                return Some(C::Reset);
            }
            match event.code {
                KeyCode::Up | KeyCode::Char('k') => Some(C::Up),
                KeyCode::Down | KeyCode::Char('j') => Some(C::Down),
                KeyCode::Home => Some(C::Home),
                KeyCode::End => Some(C::End),
                KeyCode::Enter | KeyCode::Char(' ') => Some(C::Open),
                KeyCode::Esc | KeyCode::Char('q') => Some(C::Quit),
                _ => None,
            }
        }

        Mode::EditingScalar(_) => {
            if is_key_with_ctrl(event, KeyCode::Char('u')) {
                return Some(C::ClearInput);
            }
            if let Some(c) = typed_char(event) {
                return Some(C::Insert(c));
            }
            match event.code {
                KeyCode::Enter => Some(C::Commit),
                KeyCode::Esc => Some(C::Cancel),
                KeyCode::Backspace => Some(C::Backspace),
                KeyCode::Delete => Some(C::Delete),
                KeyCode::Left => Some(C::Left),
                KeyCode::Right => Some(C::Right),
                KeyCode::Home => Some(C::Home),
                KeyCode::End => Some(C::End),
                _ => None,
            }
        }

        Mode::ViewingMultiline(_) => match event.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(C::EnableEdit),
            KeyCode::Esc | KeyCode::Char('q') => Some(C::Cancel),
            KeyCode::Up => Some(C::Up),
            KeyCode::Down => Some(C::Down),
            KeyCode::Left => Some(C::Left),
            KeyCode::Right => Some(C::Right),
            KeyCode::Home if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(C::BufferStart)
            }
            KeyCode::End if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(C::BufferEnd)
            }
            KeyCode::Home => Some(C::LineStart),
            KeyCode::End => Some(C::LineEnd),
            KeyCode::PageUp => Some(C::PageUp),
            KeyCode::PageDown => Some(C::PageDown),
            _ => None,
        },

        Mode::EditingMultiline(_) => {
            if is_key_with_ctrl(event, KeyCode::Char('s')) {
                return Some(C::SaveEdit);
            }
            if is_key_with_ctrl(event, KeyCode::Home) {
                return Some(C::BufferStart);
            }
            if is_key_with_ctrl(event, KeyCode::End) {
                return Some(C::BufferEnd);
            }
            if let Some(c) = typed_char(event) {
                return Some(C::Insert(c));
            }
            if is_key(event, KeyCode::Tab) {
                return Some(C::Tab);
            }
            match event.code {
                KeyCode::Enter => Some(C::Newline),
                KeyCode::Esc => Some(C::Cancel),
                KeyCode::Backspace => Some(C::Backspace),
                KeyCode::Delete => Some(C::Delete),
                KeyCode::Up => Some(C::Up),
                KeyCode::Down => Some(C::Down),
                KeyCode::Left => Some(C::Left),
                KeyCode::Right => Some(C::Right),
                KeyCode::Home => Some(C::LineStart),
                KeyCode::End => Some(C::LineEnd),
                KeyCode::PageUp => Some(C::PageUp),
                KeyCode::PageDown => Some(C::PageDown),
                _ => None,
            }
        }
    }
}

impl InputHandler for SettingsPanel {
    fn handle_key_event(&mut self, event: &KeyEvent, ctx: &mut InputContext) -> InputResult {
        match command_for(self.mode(), event) {
            Some(cmd) => {
                self.apply(cmd, ctx);
                InputResult::Consumed
            }
            None => InputResult::Ignored,
        }
    }

    fn is_modal(&self) -> bool {
        true // The panel is the whole screen
    }
}
