//! TOML configuration for the `taskbridge` binary.
//!
//! ```toml
//! task_prefix = "ODP"
//!
//! [tracker]
//! endpoint = "https://tracker.example.com/rpc"
//! default_author_id = 2
//!
//! [stages]
//! done = "Done"
//! in_progress = 4
//!
//! [user_mapping]
//! "dev@users.noreply.github.com" = "dev@example.com"
//!
//! [github]
//! api_base = "https://api.github.com"
//!
//! [server]
//! listen = "0.0.0.0:8080"
//! ```
//!
//! Secrets may be left out of the file and supplied through
//! `TASKBRIDGE_TRACKER_TOKEN`, `TASKBRIDGE_WEBHOOK_SECRET` and `GITHUB_TOKEN`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taskbridge_core::{StageConfig, UserMapping};
use taskbridge_tracker::{GithubConfig, TrackerConfig};

pub const TRACKER_TOKEN_ENV: &str = "TASKBRIDGE_TRACKER_TOKEN";
pub const WEBHOOK_SECRET_ENV: &str = "TASKBRIDGE_WEBHOOK_SECRET";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config value {0} must not be empty")]
    Empty(&'static str),
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

/// Webhook server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Shared secret for `X-Hub-Signature-256`; unsigned deliveries are
    /// accepted when unset.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            webhook_secret: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub task_prefix: String,
    pub tracker: TrackerConfig,
    pub stages: StageConfig,
    #[serde(default)]
    pub user_mapping: UserMapping,
    /// Pull-request summary comments are disabled when absent.
    #[serde(default)]
    pub github: Option<GithubConfig>,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
struct PrefixOnly {
    task_prefix: String,
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, raw: &str) -> Result<T, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl BridgeConfig {
    /// Load the file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: BridgeConfig = parse(path, &read(path)?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read only `task_prefix`; the other sections may be incomplete.
    pub fn load_prefix(path: &Path) -> Result<String, ConfigError> {
        let prefix: PrefixOnly = parse(path, &read(path)?)?;
        Ok(prefix.task_prefix)
    }

    /// Fill secrets from `lookup` (normally the process environment).
    /// Values found there win over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_blank(TRACKER_TOKEN_ENV) {
            self.tracker.token = Some(token);
        }
        if let Some(secret) = non_blank(WEBHOOK_SECRET_ENV) {
            self.server.webhook_secret = Some(secret);
        }
        if let (Some(github), Some(token)) = (self.github.as_mut(), non_blank(GITHUB_TOKEN_ENV)) {
            github.token = Some(token);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.task_prefix.trim().is_empty() {
            return Err(ConfigError::Empty("task_prefix"));
        }
        if self.tracker.endpoint.trim().is_empty() {
            return Err(ConfigError::Empty("tracker.endpoint"));
        }
        Ok(())
    }
}
