use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::transport::{BackoffConfig, DEFAULT_INITIAL_BACKOFF};

/// Retry settings for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retry transient failures; disabled sends every request exactly once.
    /// TOML: `retry.enabled`. Default: `true`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// First backoff bound in milliseconds.
    /// TOML: `retry.initial_backoff_ms`. Default: `100`.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound of the backoff in milliseconds. Required; there is no default.
    /// TOML: `retry.max_backoff_ms`.
    #[serde(default)]
    pub max_backoff_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: None,
        }
    }
}

impl RetryConfig {
    pub fn resolve(&self) -> Result<BackoffConfig, ConfigError> {
        let max = self.max_backoff_ms.ok_or(ConfigError::MissingBackoffMax)?;
        BackoffConfig::new(
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(max),
        )
    }
}

fn default_enabled() -> bool {
    true
}

fn default_initial_backoff_ms() -> u64 {
    u64::try_from(DEFAULT_INITIAL_BACKOFF.as_millis()).unwrap_or(100)
}
