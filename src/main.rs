use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::event::{poll as event_poll, read as event_read, Event as CrosstermEvent};
use ratatui::DefaultTerminal;
use settings_editor::app::{App, AppEvent};
use settings_editor::config::DirectoryContext;
use settings_editor::config_io::{read_settings, JsonFileStore};
use settings_editor::services::async_bridge::AsyncBridge;
use settings_editor::services::providers::HttpOptionProvider;
use settings_editor::services::settings_watcher::SettingsWatcher;
use settings_editor::services::tracing_setup;
use settings_editor::view::settings::{render_panel, PanelOptions, SettingsPanel};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Terminal settings panel for a local model server
#[derive(Parser, Debug)]
#[command(name = "settings-editor")]
#[command(about = "Edit model server settings in the terminal", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the settings file (default: <config dir>/settings-editor/settings.json)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Path to log file for diagnostics
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Only save on Ctrl+S instead of after every field commit
    #[arg(long)]
    no_auto_save: bool,

    /// How often to check the settings file for changes made elsewhere
    #[arg(long, value_name = "MS", default_value_t = 500)]
    poll_interval_ms: u64,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    dump_settings: bool,
}

/// How long to wait for input before checking async messages
const INPUT_POLL: Duration = Duration::from_millis(50);

fn run(app: &mut App, terminal: &mut DefaultTerminal) -> AnyhowResult<()> {
    let size = terminal.size()?;
    app.handle_event(AppEvent::Resize(size.width, size.height));
    app.start();

    let mut needs_render = true;
    while !app.should_quit() {
        if needs_render {
            terminal.draw(|frame| {
                if let Some(pos) = render_panel(frame, frame.area(), app.panel()) {
                    frame.set_cursor_position(pos);
                }
            })?;
            needs_render = false;
        }

        if event_poll(INPUT_POLL)? {
            needs_render |= match event_read()? {
                CrosstermEvent::Key(key) => app.handle_event(AppEvent::Key(key)),
                CrosstermEvent::Resize(width, height) => {
                    app.handle_event(AppEvent::Resize(width, height))
                }
                _ => false,
            };
        }

        needs_render |= app.process_async_messages();
    }

    Ok(())
}

fn real_main(args: Args) -> AnyhowResult<()> {
    let dir_context =
        DirectoryContext::from_system().context("Failed to determine config directories")?;
    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(|| dir_context.settings_path());

    if args.dump_settings {
        let settings = read_settings(&settings_path)
            .with_context(|| format!("Failed to read {}", settings_path.display()))?;
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| dir_context.log_path());
    if let Err(e) = tracing_setup::init_file_logging(&log_file, &args.log_level) {
        eprintln!("Warning: logging disabled ({}): {}", log_file.display(), e);
    }
    tracing::info!("Settings editor starting, file {}", settings_path.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2) // Small pool for network requests
        .thread_name("settings-async")
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let async_bridge = AsyncBridge::new();
    let watcher = SettingsWatcher::start(
        settings_path.clone(),
        Duration::from_millis(args.poll_interval_ms),
        async_bridge.sender(),
    );

    let panel = SettingsPanel::new(
        Box::new(JsonFileStore::new(&settings_path)),
        PanelOptions {
            auto_save: !args.no_auto_save,
            ..PanelOptions::default()
        },
        tracing::info_span!("panel"),
    );
    let mut app = App::new(
        panel,
        Arc::new(HttpOptionProvider::new()),
        Some(runtime.handle().clone()),
        async_bridge,
        tracing::info_span!("app"),
    );

    let mut terminal = ratatui::init();
    let result = run(&mut app, &mut terminal);
    ratatui::restore();

    watcher.stop();
    tracing::info!("Settings editor exiting");
    result
}

fn main() -> AnyhowResult<()> {
    real_main(Args::parse())
}
