use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lowest and highest temperature accepted by the panel and by `validate`
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);

/// Themes the `theme` field cycles through, in order
pub const THEMES: &[&str] = &["dark", "light", "high-contrast"];

/// Log levels the `log_level` field cycles through, in order
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// The persisted settings document
///
/// The panel edits a full copy of this struct (the draft). Every field is
/// addressable by key through [`Settings::field`] / [`Settings::set_field`]
/// except `tool_servers`, which belongs to other panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the model server (e.g., "http://localhost:11434")
    pub server_url: String,

    /// Chat model name, chosen from the server's model list
    pub model: String,

    /// Embedding model used for retrieval
    pub embedding_model: String,

    /// Vector collection queried when retrieval is enabled
    pub collection: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Maximum tokens generated per response
    pub max_tokens: u64,

    /// Number of retrieved chunks passed to the model
    pub top_k: u64,

    /// Color theme name
    pub theme: String,

    /// Minimum level written to the log file
    pub log_level: String,

    /// Stream tokens as they are generated
    pub stream: bool,

    /// Augment prompts with documents from `collection`
    pub rag_enabled: bool,

    /// Free-form system prompt (multi-line)
    pub system_prompt: String,

    /// Tool servers, managed by the tool-server panel
    pub tool_servers: Vec<ToolServer>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:11434".to_string(),
            model: String::new(),
            embedding_model: String::new(),
            collection: String::new(),
            temperature: 0.7,
            max_tokens: 2048,
            top_k: 4,
            theme: THEMES[0].to_string(),
            log_level: "info".to_string(),
            stream: false,
            rag_enabled: false,
            system_prompt: String::new(),
            tool_servers: Vec::new(),
        }
    }
}

/// A tool server entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolServer {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// A typed value read from or written to a settings field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Integer(u64),
    Bool(bool),
}

impl FieldValue {
    /// Text shown in the panel and used to seed an edit
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Bool(v) => v.to_string(),
        }
    }

    /// Whether the value counts as "set" for companion-field checks
    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::Bool(b) => *b,
            FieldValue::Float(_) | FieldValue::Integer(_) => true,
        }
    }
}

impl Settings {
    /// Read a field by key
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        Some(match key {
            "server_url" => FieldValue::Text(self.server_url.clone()),
            "model" => FieldValue::Text(self.model.clone()),
            "embedding_model" => FieldValue::Text(self.embedding_model.clone()),
            "collection" => FieldValue::Text(self.collection.clone()),
            "temperature" => FieldValue::Float(self.temperature),
            "max_tokens" => FieldValue::Integer(self.max_tokens),
            "top_k" => FieldValue::Integer(self.top_k),
            "theme" => FieldValue::Text(self.theme.clone()),
            "log_level" => FieldValue::Text(self.log_level.clone()),
            "stream" => FieldValue::Bool(self.stream),
            "rag_enabled" => FieldValue::Bool(self.rag_enabled),
            "system_prompt" => FieldValue::Text(self.system_prompt.clone()),
            _ => return None,
        })
    }

    /// Write a field by key.
    ///
    /// Returns false (and leaves the document untouched) when the key is
    /// unknown or the value has the wrong type for that key.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> bool {
        match (key, value) {
            ("server_url", FieldValue::Text(v)) => self.server_url = v,
            ("model", FieldValue::Text(v)) => self.model = v,
            ("embedding_model", FieldValue::Text(v)) => self.embedding_model = v,
            ("collection", FieldValue::Text(v)) => self.collection = v,
            ("temperature", FieldValue::Float(v)) => self.temperature = v,
            ("max_tokens", FieldValue::Integer(v)) => self.max_tokens = v,
            ("top_k", FieldValue::Integer(v)) => self.top_k = v,
            ("theme", FieldValue::Text(v)) => self.theme = v,
            ("log_level", FieldValue::Text(v)) => self.log_level = v,
            ("stream", FieldValue::Bool(v)) => self.stream = v,
            ("rag_enabled", FieldValue::Bool(v)) => self.rag_enabled = v,
            ("system_prompt", FieldValue::Text(v)) => self.system_prompt = v,
            _ => return false,
        }
        true
    }

    /// Validate the document before it is written
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server_url cannot be empty".to_string(),
            ));
        }

        let (min, max) = TEMPERATURE_RANGE;
        if !self.temperature.is_finite() || self.temperature < min || self.temperature > max {
            return Err(ConfigError::ValidationError(format!(
                "temperature must be between {min} and {max}"
            )));
        }

        if !THEMES.contains(&self.theme.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown theme '{}'",
                self.theme
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }

        for server in &self.tool_servers {
            if server.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "tool server name cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Directory paths used by the settings editor
///
/// Only `main` should call [`DirectoryContext::from_system`]; everything
/// else receives the context by parameter so tests can use temp dirs.
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// Config directory, e.g. ~/.config/settings-editor on Linux
    pub config_dir: PathBuf,

    /// State directory for logs
    pub data_dir: PathBuf,
}

impl DirectoryContext {
    /// Create a DirectoryContext from the system directories
    pub fn from_system() -> std::io::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config directory",
                )
            })?
            .join("settings-editor");

        let data_dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("settings-editor");

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Create a DirectoryContext rooted in a temp directory
    pub fn for_testing(temp_dir: &std::path::Path) -> Self {
        Self {
            config_dir: temp_dir.join("config"),
            data_dir: temp_dir.join("data"),
        }
    }

    /// Default location of the settings document
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Default location of the log file
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("settings-editor.log")
    }
}
