//! Configuration loader and validator for the LenoreFin client.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::graph::Topic;

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "LENOREFIN_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    pub api: Api,
    /// Extra `topic -> dependents` edges merged into the default graph.
    #[serde(default)]
    pub invalidation: HashMap<Topic, Vec<Topic>>,
}

/// Client-side behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct App {
    /// Minimum level (0 debug, 1 info, 2 error) forwarded to the remote log.
    pub audit_level: u8,
    pub notification_timeout_ms: u64,
    pub health_poll_interval_ms: u64,
    pub health_max_attempts: u32,
}

impl Default for App {
    fn default() -> Self {
        Self {
            audit_level: 0,
            notification_timeout_ms: 1500,
            health_poll_interval_ms: 1000,
            health_max_attempts: 60,
        }
    }
}

/// REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub base_url: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Runtime-injected credential; takes precedence over every other source.
    #[serde(default)]
    pub key: Option<String>,
    /// Send transaction details inside the create payload instead of
    /// creating them one by one after the parent.
    #[serde(default)]
    pub server_side_details: bool,
}

fn default_prefix() -> String {
    "/api/v1".to_string()
}

/// Where a bearer credential may come from, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Injected(Option<String>),
    Env(&'static str),
    BuildTime(Option<&'static str>),
}

impl CredentialSource {
    fn read(&self) -> Option<String> {
        let raw = match self {
            CredentialSource::Injected(v) => v.clone(),
            CredentialSource::Env(name) => std::env::var(name).ok(),
            CredentialSource::BuildTime(v) => v.map(str::to_string),
        };
        raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }
}

/// Return the first non-empty credential among `sources`.
pub fn resolve_credential(sources: &[CredentialSource]) -> Option<String> {
    sources.iter().find_map(CredentialSource::read)
}

impl Config {
    /// Credential sources for this config: config file, environment, build.
    pub fn credential_sources(&self) -> Vec<CredentialSource> {
        vec![
            CredentialSource::Injected(self.api.key.clone()),
            CredentialSource::Env(API_KEY_ENV),
            CredentialSource::BuildTime(option_env!("LENOREFIN_API_KEY")),
        ]
    }

    /// Resolve the bearer credential once. Fails when no source yields one.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        resolve_credential(&self.credential_sources())
            .ok_or(ConfigError::Invalid("no API key in api.key, LENOREFIN_API_KEY or build"))
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let base = cfg.api.base_url.trim();
    if base.is_empty() {
        return Err(ConfigError::Invalid("api.base_url must be non-empty"));
    }
    match reqwest::Url::parse(base) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => return Err(ConfigError::Invalid("api.base_url must be an http(s) URL")),
    }
    if cfg.api.prefix.trim_matches('/').is_empty() {
        return Err(ConfigError::Invalid("api.prefix must be non-empty"));
    }
    if cfg.app.audit_level > 2 {
        return Err(ConfigError::Invalid("app.audit_level must be 0, 1 or 2"));
    }
    if cfg.app.notification_timeout_ms == 0 {
        return Err(ConfigError::Invalid("app.notification_timeout_ms must be > 0"));
    }
    if cfg.app.health_poll_interval_ms == 0 {
        return Err(ConfigError::Invalid("app.health_poll_interval_ms must be > 0"));
    }
    Ok(())
}

/// Returns a complete example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  audit_level: 0
  notification_timeout_ms: 1500
  health_poll_interval_ms: 1000
  health_max_attempts: 60

api:
  base_url: "http://localhost:8000/"
  prefix: "/api/v1"
  key: "YOUR_LENOREFIN_API_KEY"
  server_side_details: false

invalidation:
  budgets:
    - expense_graph
"#
}
