use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "COURSEHUB_CONFIG";
pub const API_URL_ENV: &str = "COURSEHUB_API_URL";
pub const API_TOKEN_ENV: &str = "COURSEHUB_API_TOKEN";
pub const TIMEOUT_ENV: &str = "COURSEHUB_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the platform REST API, e.g. `http://localhost:3000/api`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Defaults, then the config file (if one exists), then environment.
    pub fn load() -> Result<Self> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn apply_env(&mut self) {
        if let Some(url) = non_empty_var(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(token) = non_empty_var(API_TOKEN_ENV) {
            self.token = Some(token);
        }
        if let Some(timeout) = non_empty_var(TIMEOUT_ENV).and_then(|raw| raw.parse().ok()) {
            self.timeout_secs = timeout;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// `$COURSEHUB_CONFIG`, or `coursehub/config.toml` under the platform config dir.
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = non_empty_var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("coursehub").join("config.toml"))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn default_api_url() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}
