//! Deferred actions requested by the settings panel

use super::App;
use crate::input::handler::{DeferredAction, InputContext};
use crate::view::settings::SettingsChanged;

impl App {
    /// Execute the actions a handler deferred, in order
    pub(super) fn run_deferred(&mut self, mut ctx: InputContext) {
        for action in ctx.take_actions() {
            match action {
                DeferredAction::Notify(changed) => self.notify_listeners(changed),
                DeferredAction::FetchOptions(source) => self.spawn_fetch(source),
                DeferredAction::CheckConnection => self.check_connection(),
                DeferredAction::Quit => {
                    let _guard = self.span.enter();
                    tracing::info!("Quit requested");
                    self.should_quit = true;
                }
            }
        }
    }

    /// Send a change notification to every listener, dropping closed ones
    fn notify_listeners(&mut self, changed: SettingsChanged) {
        let _guard = self.span.enter();
        tracing::info!(
            key = changed.key.unwrap_or("*"),
            listeners = self.listeners.len(),
            "Settings changed"
        );
        self.listeners
            .retain(|listener| listener.send(changed.clone()).is_ok());
    }
}
