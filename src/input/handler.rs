//! Input handling plumbing
//!
//! Key events are dispatched to an [`InputHandler`], which mutates its own
//! state and records any follow-up work in the [`InputContext`]. Work that
//! needs the application (notifying listeners, spawning async tasks,
//! quitting) is returned as a [`DeferredAction`] and executed by the update
//! loop once the handler has finished.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::services::providers::OptionSource;
use crate::view::settings::SettingsChanged;

/// Result of handling an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// The input was handled - stop propagation.
    Consumed,
    /// The input was not handled.
    Ignored,
}

impl InputResult {
    /// Returns true if the input was consumed.
    pub fn is_consumed(self) -> bool {
        self == InputResult::Consumed
    }
}

/// Context passed to input handlers, collecting deferred work.
#[derive(Debug, Default)]
pub struct InputContext {
    /// Actions to execute after input handling, in the order they were deferred.
    pub deferred_actions: Vec<DeferredAction>,
}

impl InputContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, action: DeferredAction) {
        self.deferred_actions.push(action);
    }

    /// Take the deferred actions, leaving the context empty
    pub fn take_actions(&mut self) -> Vec<DeferredAction> {
        std::mem::take(&mut self.deferred_actions)
    }
}

/// Actions that need to be executed after input handling completes.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    /// Tell collaborators that the settings document was saved
    Notify(SettingsChanged),
    /// Fetch a remote option list for the current server
    FetchOptions(OptionSource),
    /// Check connectivity to the current server
    CheckConnection,
    /// Leave the application
    Quit,
}

/// Trait for elements that can handle input events.
pub trait InputHandler {
    /// Handle a key event. Returns whether the event was consumed.
    fn handle_key_event(&mut self, event: &KeyEvent, ctx: &mut InputContext) -> InputResult;

    /// Whether this handler is modal (consumes all unhandled input).
    fn is_modal(&self) -> bool {
        false
    }

    /// Main entry point: handle the event, then apply the modal rule.
    fn dispatch_input(&mut self, event: &KeyEvent, ctx: &mut InputContext) -> InputResult {
        if self.handle_key_event(event, ctx).is_consumed() || self.is_modal() {
            return InputResult::Consumed;
        }
        InputResult::Ignored
    }
}

/// Helper to check for common key combinations.
pub fn is_key(event: &KeyEvent, code: KeyCode) -> bool {
    event.code == code && event.modifiers.is_empty()
}

pub fn is_key_with_ctrl(event: &KeyEvent, code: KeyCode) -> bool {
    event.code == code && event.modifiers == KeyModifiers::CONTROL
}
