//! Settings file watcher
//!
//! Other components (a chat front end, another panel instance) write the
//! same settings file. The watcher polls it on a background thread and
//! pushes every new version into the update loop as
//! [`AsyncMessage::ExternalSettings`], where it is merged into the draft.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config_io::read_settings;
use crate::services::async_bridge::AsyncMessage;

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Handle to the polling thread; dropping it stops the thread.
pub struct SettingsWatcher {
    stop_signal: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

fn read_raw(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

impl SettingsWatcher {
    /// Start watching `path`. The content at start is the baseline and is
    /// not reported.
    pub fn start(path: PathBuf, interval: Duration, sender: Sender<AsyncMessage>) -> Self {
        tracing::debug!(
            "Watching {} every {:?} for external changes",
            path.display(),
            interval
        );
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop = stop_signal.clone();

        // Sleep in small increments to allow quick shutdown
        let sleep_increment = interval.min(Duration::from_millis(50));

        let thread = thread::spawn(move || {
            let mut last_seen = read_raw(&path);
            loop {
                let wake = Instant::now() + interval;
                while Instant::now() < wake {
                    if stop.load(Ordering::SeqCst) {
                        tracing::debug!("Settings watcher stopping");
                        return;
                    }
                    thread::sleep(sleep_increment);
                }

                let current = read_raw(&path);
                if current == last_seen {
                    continue;
                }
                last_seen = current;

                match read_settings(&path) {
                    Ok(settings) => {
                        tracing::debug!("External settings change detected");
                        if sender.send(AsyncMessage::ExternalSettings(settings)).is_err() {
                            return; // Receiver dropped, exit
                        }
                    }
                    Err(e) => {
                        // Possibly a writer mid-update; the next complete write is picked up
                        tracing::warn!("Ignoring unreadable settings file: {}", e);
                    }
                }
            }
        });

        Self {
            stop_signal,
            thread: Some(thread),
        }
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SettingsWatcher {
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }
}
