//! Remote option providers and connectivity check.
//!
//! Closed-choice fields (model, embedding model, collection) take their
//! choices from the model server. Providers are async so the update loop can
//! run them as detached tasks; results come back as ordinary events through
//! the async bridge.
//!
//! The HTTP provider speaks the Ollama-style API:
//! - `GET {server}/api/tags` → `{"models": [{"name": ..., ...}]}`
//! - `GET {server}/api/collections` → `{"collections": [{"name": ..., ...}]}`
//! - `GET {server}/api/version` → `{"version": "..."}`

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

/// Timeout for each HTTP request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Which remote list a closed-choice field draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionSource {
    Models,
    Collections,
}

impl OptionSource {
    pub fn label(&self) -> &'static str {
        match self {
            OptionSource::Models => "models",
            OptionSource::Collections => "collections",
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            OptionSource::Models => "api/tags",
            OptionSource::Collections => "api/collections",
        }
    }

    fn list_key(&self) -> &'static str {
        match self {
            OptionSource::Models => "models",
            OptionSource::Collections => "collections",
        }
    }
}

/// One entry of a remote option list
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteOption {
    pub name: String,
    /// Everything else the server reported about the entry
    pub attributes: Map<String, Value>,
}

impl RemoteOption {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Map::new(),
        }
    }
}

/// Remote option fetch or connectivity check failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    Http(String),
    Parse(String),
    Task(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Http(msg) => write!(f, "request failed: {msg}"),
            ProviderError::Parse(msg) => write!(f, "unexpected response: {msg}"),
            ProviderError::Task(msg) => write!(f, "task failed: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of remote option lists and connectivity checks
#[async_trait]
pub trait OptionProvider: Send + Sync {
    /// Fetch the option list for `source` from the server at `server_url`
    async fn fetch(
        &self,
        server_url: &str,
        source: OptionSource,
    ) -> Result<Vec<RemoteOption>, ProviderError>;

    /// Check that the server answers; returns its version string
    async fn check_connection(&self, server_url: &str) -> Result<String, ProviderError>;
}

/// Provider backed by blocking `ureq` requests on the blocking pool
#[derive(Debug, Clone, Default)]
pub struct HttpOptionProvider;

impl HttpOptionProvider {
    pub fn new() -> Self {
        Self
    }
}

fn endpoint_url(server_url: &str, path: &str) -> String {
    format!("{}/{}", server_url.trim_end_matches('/'), path)
}

fn get_json(url: &str) -> Result<Value, ProviderError> {
    tracing::debug!("GET {}", url);
    let response = ureq::get(url)
        .set("Accept", "application/json")
        .timeout(REQUEST_TIMEOUT)
        .call()
        .map_err(|e| {
            tracing::debug!("HTTP request failed: {}", e);
            ProviderError::Http(e.to_string())
        })?;

    let body = response
        .into_string()
        .map_err(|e| ProviderError::Http(format!("failed to read response body: {e}")))?;

    serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Parse a list response: `{"<key>": [{"name": ..}, ..]}` or a bare array.
/// Entries may also be plain strings.
pub fn parse_option_list(body: &Value, key: &str) -> Result<Vec<RemoteOption>, ProviderError> {
    let entries = body
        .get(key)
        .or(Some(body))
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Parse(format!("'{key}' list not found")))?;

    entries
        .iter()
        .map(|entry| match entry {
            Value::String(name) => Ok(RemoteOption::named(name.clone())),
            Value::Object(fields) => {
                let mut attributes = fields.clone();
                match attributes.remove("name") {
                    Some(Value::String(name)) => Ok(RemoteOption { name, attributes }),
                    _ => Err(ProviderError::Parse("entry without a name".to_string())),
                }
            }
            other => Err(ProviderError::Parse(format!("unexpected entry {other}"))),
        })
        .collect()
}

fn parse_version(body: &Value) -> Result<String, ProviderError> {
    body.get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::Parse("version not found".to_string()))
}

async fn blocking_get(url: String) -> Result<Value, ProviderError> {
    tokio::task::spawn_blocking(move || get_json(&url))
        .await
        .map_err(|e| ProviderError::Task(e.to_string()))?
}

#[async_trait]
impl OptionProvider for HttpOptionProvider {
    async fn fetch(
        &self,
        server_url: &str,
        source: OptionSource,
    ) -> Result<Vec<RemoteOption>, ProviderError> {
        let body = blocking_get(endpoint_url(server_url, source.endpoint())).await?;
        let options = parse_option_list(&body, source.list_key())?;
        tracing::debug!("Fetched {} {}", options.len(), source.label());
        Ok(options)
    }

    async fn check_connection(&self, server_url: &str) -> Result<String, ProviderError> {
        let body = blocking_get(endpoint_url(server_url, "api/version")).await?;
        parse_version(&body)
    }
}

/// Fixed in-process provider for tests
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    pub models: Vec<String>,
    pub collections: Vec<String>,
    /// When set, every call fails with this message
    pub failure: Option<String>,
}

impl StaticProvider {
    pub fn new(models: &[&str], collections: &[&str]) -> Self {
        Self {
            models: models.iter().map(|s| s.to_string()).collect(),
            collections: collections.iter().map(|s| s.to_string()).collect(),
            failure: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl OptionProvider for StaticProvider {
    async fn fetch(
        &self,
        _server_url: &str,
        source: OptionSource,
    ) -> Result<Vec<RemoteOption>, ProviderError> {
        if let Some(msg) = &self.failure {
            return Err(ProviderError::Http(msg.clone()));
        }
        let names = match source {
            OptionSource::Models => &self.models,
            OptionSource::Collections => &self.collections,
        };
        Ok(names.iter().map(RemoteOption::named).collect())
    }

    async fn check_connection(&self, _server_url: &str) -> Result<String, ProviderError> {
        match &self.failure {
            Some(msg) => Err(ProviderError::Http(msg.clone())),
            None => Ok("static".to_string()),
        }
    }
}
