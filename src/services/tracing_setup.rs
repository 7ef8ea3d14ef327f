//! Logging initialisation
//!
//! The terminal is in raw mode while the panel runs, so diagnostics go to a
//! log file. `RUST_LOG` overrides the level chosen on the command line.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("settings_editor={level},warn")))
}

/// Install the global subscriber, appending to `log_file`
pub fn init_file_logging(log_file: &Path, level: &str) -> io::Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(default_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))
}
