mod retry;
mod token;

pub use retry::RetryConfig;
pub use token::TokenConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::service::ApiEnvironment;
use crate::transport::{BackoffConfig, Dispatcher};

pub const DEFAULT_CONFIG_FILE: &str = "appstore.toml";

/// Environment variables with this prefix override the TOML file; `__` separates nested keys,
/// e.g. `APPSTORE_RETRY__MAX_BACKOFF_MS`.
pub const ENV_PREFIX: &str = "APPSTORE_";

/// Client configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Which App Store environment to call.
    /// TOML: `environment`. Default: `Production`.
    #[serde(default)]
    pub environment: ApiEnvironment,

    /// Overrides the environment's base URL (tests, mock servers).
    /// TOML: `base_url`. Example: `http://127.0.0.1:8080/inApps/`.
    #[serde(default)]
    pub base_url: Option<Url>,

    /// TOML: `user_agent`. Default: `appstore-api/<version>`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional upstream HTTP proxy. If set, used for the reqwest client.
    /// TOML: `proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing; disabled forces HTTP/1.
    /// TOML: `enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,

    /// TOML: `connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Per-attempt timeout, covering the whole request and body.
    /// TOML: `timeout_secs`. Default: `30`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry settings (see `retry` table).
    #[serde(default)]
    pub retry: RetryConfig,

    /// Signing key settings (see `token` table).
    #[serde(default)]
    pub token: TokenConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: ApiEnvironment::default(),
            base_url: None,
            user_agent: default_user_agent(),
            proxy: None,
            enable_multiplexing: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
            token: TokenConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Builds a Figment that merges defaults, the TOML file (if present) and `APPSTORE_*` env.
    pub fn figment(path: Option<&Path>) -> Figment {
        let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

        let mut figment = Figment::new().merge(Serialized::defaults(ClientConfig::default()));
        if path.is_file() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration. Required fields are validated lazily by the resolvers below.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(path).extract()?)
    }

    pub fn backoff(&self) -> Result<BackoffConfig, ConfigError> {
        self.retry.resolve()
    }

    /// Base URL with a trailing slash, so endpoint paths append to it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut url = self
            .base_url
            .clone()
            .unwrap_or_else(|| self.environment.base_url());
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(url));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.timeout_secs));

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        if !self.enable_multiplexing {
            builder = builder.http1_only();
        }

        Ok(builder.build()?)
    }

    pub fn dispatcher(&self) -> Result<Dispatcher, ConfigError> {
        Ok(Dispatcher::new(self.http_client()?, self.backoff()?))
    }

    pub fn log_effective(&self) {
        tracing::info!(
            environment = ?self.environment,
            base_url = %self.base_url.as_ref().map_or("<environment default>", Url::as_str),
            proxy = %self.proxy.as_ref().map_or("<none>", Url::as_str),
            enable_multiplexing = self.enable_multiplexing,
            retry_enabled = self.retry.enabled,
            initial_backoff_ms = self.retry.initial_backoff_ms,
            max_backoff_ms = ?self.retry.max_backoff_ms,
            "App Store client config (effective)"
        );
    }
}

fn default_user_agent() -> String {
    format!("appstore-api/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}
