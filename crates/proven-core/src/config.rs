use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ProvenError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:9000/api";
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;
pub const DEFAULT_STORE_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "PROVEN_API_URL";
pub const ENV_IDLE_TIMEOUT_SECS: &str = "PROVEN_IDLE_TIMEOUT_SECS";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_store_poll_interval_ms() -> u64 {
    DEFAULT_STORE_POLL_INTERVAL_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Client configuration, stored as `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL the credential and resource endpoints live under.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// How often the file-backed session store looks for writes by other processes.
    #[serde(default = "default_store_poll_interval_ms")]
    pub store_poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            idle_timeout_secs: default_idle_timeout_secs(),
            store_poll_interval_ms: default_store_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn store_poll_interval(&self) -> Duration {
        Duration::from_millis(self.store_poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_IDLE_TIMEOUT_SECS) {
            self.idle_timeout_secs = raw.trim().parse().map_err(|_| {
                ProvenError::config(format!("{} must be a number of seconds", ENV_IDLE_TIMEOUT_SECS))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ProvenError::config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        if self.idle_timeout_secs == 0 {
            return Err(ProvenError::config("idle_timeout_secs must be positive"));
        }
        if self.store_poll_interval_ms == 0 {
            return Err(ProvenError::config("store_poll_interval_ms must be positive"));
        }
        Ok(())
    }
}
