//! Settings persistence.
//!
//! The panel only talks to the [`SettingsStore`] trait: `load` at activation
//! and reset, `save` on explicit save or an auto-saved field commit.

use crate::config::{ConfigError, Settings};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persistence gateway for the settings document
pub trait SettingsStore: Send {
    /// Load the persisted settings, or defaults when nothing was saved yet
    fn load(&self) -> Result<Settings, ConfigError>;

    /// Validate and persist the settings
    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError>;
}

/// Stores settings as pretty-printed JSON on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a settings document from `path`; a missing file yields defaults
pub fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_json::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        let settings = read_settings(&self.path)?;
        tracing::debug!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        settings.validate()?;

        if let Some(parent_dir) = self.path.parent() {
            std::fs::create_dir_all(parent_dir)
                .map_err(|e| ConfigError::IoError(format!("{}: {}", parent_dir.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        // Readers only ever see a complete document
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", tmp_path.display(), e)))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store
///
/// Clones share the same document, so a test can keep a handle and inspect
/// what the panel wrote. `fail_saves` makes every save return an IO error.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    settings: Option<Settings>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.settings = Some(settings);
        }
        store
    }

    /// Last saved (or seeded) document
    pub fn saved(&self) -> Option<Settings> {
        self.inner.lock().ok().and_then(|inner| inner.settings.clone())
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.saves).unwrap_or(0)
    }

    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_saves = fail;
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(inner.settings.clone().unwrap_or_default())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        if inner.fail_saves {
            return Err(ConfigError::IoError("store is read-only".to_string()));
        }
        inner.settings = Some(settings.clone());
        inner.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");
        let mut store = JsonFileStore::new(&path);

        let mut settings = Settings::default();
        settings.model = "llama3".to_string();
        settings.system_prompt = "line one\nline two".to_string();
        store.save(&settings).unwrap();

        assert!(path.exists());
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_save_rejects_invalid_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        let mut store = JsonFileStore::new(&path);

        let mut settings = Settings::default();
        settings.temperature = 9.0;
        assert!(matches!(
            store.save(&settings),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_parse_error_reports_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        match JsonFileStore::new(&path).load() {
            Err(ConfigError::ParseError(msg)) => assert!(msg.contains("settings.json")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_memory_store_shares_state_and_fails_on_demand() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        handle.save(&Settings::default()).unwrap();
        assert_eq!(store.save_count(), 1);

        store.set_fail_saves(true);
        assert!(matches!(
            handle.save(&Settings::default()),
            Err(ConfigError::IoError(_))
        ));
        assert_eq!(store.save_count(), 1);
    }
}
