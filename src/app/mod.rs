//! Application update loop
//!
//! [`App`] is the single writer of all panel state. The binary feeds it one
//! [`AppEvent`] at a time (a key, a resize, or a message from an async task)
//! and each event is handled to completion before the next is taken.

mod async_messages;
mod settings_actions;

use std::sync::mpsc;
use std::sync::Arc;

use crossterm::event::{KeyEvent, KeyEventKind};
use tracing::Span;

use crate::input::handler::{InputContext, InputHandler};
use crate::services::async_bridge::{AsyncBridge, AsyncMessage};
use crate::services::providers::OptionProvider;
use crate::view::settings::{SettingsChanged, SettingsPanel};

/// One input to the update loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Async(AsyncMessage),
}

pub struct App {
    panel: SettingsPanel,
    provider: Arc<dyn OptionProvider>,
    /// Runtime for detached fetches and connectivity checks
    runtime: Option<tokio::runtime::Handle>,
    async_bridge: AsyncBridge,
    /// Bumped whenever the server changes; older async results are dropped
    generation: u64,
    listeners: Vec<mpsc::Sender<SettingsChanged>>,
    should_quit: bool,
    span: Span,
}

impl App {
    pub fn new(
        panel: SettingsPanel,
        provider: Arc<dyn OptionProvider>,
        runtime: Option<tokio::runtime::Handle>,
        async_bridge: AsyncBridge,
        span: Span,
    ) -> Self {
        if runtime.is_none() {
            span.in_scope(|| {
                tracing::warn!("No Tokio runtime - option lists and connectivity checks disabled")
            });
        }
        Self {
            panel,
            provider,
            runtime,
            async_bridge,
            generation: 0,
            listeners: Vec::new(),
            should_quit: false,
            span,
        }
    }

    pub fn panel(&self) -> &SettingsPanel {
        &self.panel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if the application should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Register a collaborator for "settings changed" notifications
    pub fn subscribe(&mut self) -> mpsc::Receiver<SettingsChanged> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    /// Kick off the initial connectivity check
    pub fn start(&mut self) {
        self.check_connection();
    }

    /// Handle one event to completion. Returns whether a redraw is needed.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                let mut ctx = InputContext::new();
                self.panel.dispatch_input(&key, &mut ctx);
                self.run_deferred(ctx);
                true
            }
            AppEvent::Resize(width, height) => {
                self.panel.resize(width, height);
                true
            }
            AppEvent::Async(message) => self.handle_async_message(message),
        }
    }
}
