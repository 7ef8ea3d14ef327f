// PanelTestHarness - drives the settings panel through key events on a virtual terminal

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use settings_editor::app::{App, AppEvent};
use settings_editor::config::Settings;
use settings_editor::config_io::MemoryStore;
use settings_editor::services::async_bridge::AsyncBridge;
use settings_editor::services::providers::{OptionProvider, StaticProvider};
use settings_editor::view::settings::{render_panel, PanelOptions, SettingsChanged, SettingsPanel};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Virtual terminal plus an [`App`] wired to an in-memory store
pub struct PanelTestHarness {
    app: App,
    store: MemoryStore,
    terminal: Terminal<TestBackend>,
    notifications: mpsc::Receiver<SettingsChanged>,
    /// Keeps spawned tasks alive for the lifetime of the harness
    _runtime: Option<tokio::runtime::Runtime>,
}

impl PanelTestHarness {
    /// Panel over `settings` with no async runtime
    pub fn new(settings: Settings, width: u16, height: u16) -> std::io::Result<Self> {
        Self::build(
            settings,
            PanelOptions::default(),
            Arc::new(StaticProvider::default()),
            None,
            width,
            height,
        )
    }

    /// Panel with auto-save turned off
    pub fn without_auto_save(settings: Settings) -> std::io::Result<Self> {
        Self::build(
            settings,
            PanelOptions {
                auto_save: false,
                ..PanelOptions::default()
            },
            Arc::new(StaticProvider::default()),
            None,
            80,
            30,
        )
    }

    /// Panel with a real multi-thread runtime running `provider`
    pub fn with_provider(
        settings: Settings,
        provider: Arc<dyn OptionProvider>,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        Self::build(
            settings,
            PanelOptions::default(),
            provider,
            Some(runtime),
            80,
            30,
        )
    }

    fn build(
        settings: Settings,
        options: PanelOptions,
        provider: Arc<dyn OptionProvider>,
        runtime: Option<tokio::runtime::Runtime>,
        width: u16,
        height: u16,
    ) -> std::io::Result<Self> {
        let store = MemoryStore::with_settings(settings);
        let panel = SettingsPanel::new(Box::new(store.clone()), options, tracing::Span::none());
        let mut app = App::new(
            panel,
            provider,
            runtime.as_ref().map(|rt| rt.handle().clone()),
            AsyncBridge::new(),
            tracing::Span::none(),
        );
        let notifications = app.subscribe();
        app.handle_event(AppEvent::Resize(width, height));

        let terminal = Terminal::new(TestBackend::new(width, height))?;

        Ok(Self {
            app,
            store,
            terminal,
            notifications,
            _runtime: runtime,
        })
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn panel(&self) -> &SettingsPanel {
        self.app.panel()
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.app
            .handle_event(AppEvent::Key(KeyEvent::new(code, modifiers)));
    }

    pub fn press(&mut self, code: KeyCode) {
        self.send_key(code, KeyModifiers::NONE);
    }

    pub fn ctrl(&mut self, c: char) {
        self.send_key(KeyCode::Char(c), KeyModifiers::CONTROL);
    }

    /// Type text; `\n` becomes Enter
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => self.press(KeyCode::Enter),
                c => self.press(KeyCode::Char(c)),
            }
        }
    }

    /// Move the selection to the field with `key`
    pub fn select(&mut self, key: &str) {
        self.press(KeyCode::Home);
        while self.panel().selected_field().key != key {
            let before = self.panel().selected();
            self.press(KeyCode::Down);
            assert_ne!(before, self.panel().selected(), "no field named {key}");
        }
    }

    /// Open the selected scalar field, replace its text and commit
    pub fn edit_field(&mut self, key: &str, text: &str) {
        self.select(key);
        self.press(KeyCode::Enter);
        self.ctrl('u');
        self.type_text(text);
        self.press(KeyCode::Enter);
    }

    /// Notifications received since the last call
    pub fn drain_notifications(&self) -> Vec<SettingsChanged> {
        self.notifications.try_iter().collect()
    }

    /// Pump async messages until `condition` holds or `timeout` elapses
    pub fn wait_until<F>(&mut self, timeout: Duration, condition: F) -> bool
    where
        F: Fn(&SettingsPanel) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.app.process_async_messages();
            if condition(self.app.panel()) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn render(&mut self) -> std::io::Result<()> {
        let panel = self.app.panel();
        self.terminal.draw(|frame| {
            if let Some(pos) = render_panel(frame, frame.area(), panel) {
                frame.set_cursor_position(pos);
            }
        })?;
        Ok(())
    }

    /// Rendered screen, one string per row
    pub fn screen_rows(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    pub fn screen_to_string(&self) -> String {
        self.screen_rows().join("\n")
    }

    pub fn assert_screen_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            screen.contains(text),
            "Expected screen to contain '{text}'\nScreen:\n{screen}"
        );
    }
}
