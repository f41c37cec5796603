//! Client configuration for the tracker RPC endpoint and GitHub.

use serde::{Deserialize, Serialize};

/// Retry policy shared by every remote call.
///
/// Delays double from `base_delay_ms` on each attempt; at most
/// `max_attempts` requests are sent per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base_delay_ms.max(1),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

/// Tracker RPC configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// JSON-RPC endpoint URL
    pub endpoint: String,
    /// Bearer token (optional for open trackers)
    #[serde(default)]
    pub token: Option<String>,
    /// Tracker user that messages fall back to when the author is unknown
    #[serde(default)]
    pub default_author_id: Option<u64>,
    /// Per-request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl TrackerConfig {
    pub fn new(endpoint: &str) -> Self {
        TrackerConfig {
            endpoint: endpoint.to_string(),
            token: None,
            default_author_id: None,
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_default_author(mut self, author_id: u64) -> Self {
        self.default_author_id = Some(author_id);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// GitHub REST configuration for pull-request comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
            token: None,
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryPolicy::default(),
        }
    }
}

impl GithubConfig {
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
