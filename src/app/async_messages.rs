//! Async message handling and task dispatch

use tracing::Instrument;

use super::App;
use crate::input::handler::InputContext;
use crate::services::async_bridge::AsyncMessage;
use crate::services::providers::{OptionSource, ProviderError};

impl App {
    /// Process pending async messages from the async bridge
    ///
    /// Called each frame by the main loop. Messages are handled one at a
    /// time, in arrival order. Returns whether a redraw is needed.
    pub fn process_async_messages(&mut self) -> bool {
        let messages = self.async_bridge.try_recv_all();
        let mut needs_render = false;
        for message in messages {
            needs_render |= self.handle_async_message(message);
        }
        needs_render
    }

    pub(super) fn handle_async_message(&mut self, message: AsyncMessage) -> bool {
        let _guard = self.span.enter();

        match message {
            AsyncMessage::OptionsLoaded {
                source,
                generation,
                result,
            } => {
                if generation != self.generation {
                    tracing::debug!(
                        "Dropping {} for stale generation {} (current {})",
                        source.label(),
                        generation,
                        self.generation
                    );
                    return false;
                }
                self.panel.apply_options(source, result);
                true
            }
            AsyncMessage::ConnectivityChecked { generation, result } => {
                if generation != self.generation {
                    tracing::debug!("Dropping stale connectivity result");
                    return false;
                }
                self.panel.apply_connectivity(result);
                true
            }
            AsyncMessage::ExternalSettings(settings) => {
                let mut ctx = InputContext::new();
                self.panel.merge_external(&settings, &mut ctx);
                drop(_guard);
                self.run_deferred(ctx);
                true
            }
        }
    }

    pub(super) fn spawn_fetch(&mut self, source: OptionSource) {
        let Some(runtime) = &self.runtime else {
            self.panel.apply_options(
                source,
                Err(ProviderError::Task("async runtime not available".to_string())),
            );
            return;
        };

        let provider = self.provider.clone();
        let sender = self.async_bridge.sender();
        let generation = self.generation;
        let server_url = self.panel.settings().server_url.clone();

        runtime.spawn(
            async move {
                let result = provider.fetch(&server_url, source).await;
                let _ = sender.send(AsyncMessage::OptionsLoaded {
                    source,
                    generation,
                    result,
                });
            }
            .instrument(self.span.clone()),
        );
    }

    /// Start a connectivity check against the current server.
    ///
    /// Every check opens a new generation, so results for the previous
    /// server are dropped when they arrive.
    pub(super) fn check_connection(&mut self) {
        self.generation += 1;
        let Some(runtime) = &self.runtime else {
            return;
        };

        let provider = self.provider.clone();
        let sender = self.async_bridge.sender();
        let generation = self.generation;
        let server_url = self.panel.settings().server_url.clone();

        runtime.spawn(
            async move {
                let result = provider.check_connection(&server_url).await;
                let _ = sender.send(AsyncMessage::ConnectivityChecked { generation, result });
            }
            .instrument(self.span.clone()),
        );
    }
}
