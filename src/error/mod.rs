mod dispatch;

pub use dispatch::{DispatchCause, DispatchError};

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("retry.max_backoff_ms must be set")]
    MissingBackoffMax,

    #[error("backoff durations must be non-zero")]
    ZeroBackoff,

    #[error("initial backoff {initial:?} exceeds max backoff {max:?}")]
    BackoffOrder { initial: Duration, max: Duration },

    #[error("token.{0} must be set and non-empty")]
    MissingTokenField(&'static str),

    #[error("token ttl must be between 1 and 3600 seconds, got {0}")]
    InvalidTokenTtl(u64),

    #[error("failed to read private key {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("base url {0} cannot be used as a base")]
    InvalidBaseUrl(url::Url),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

#[derive(Debug, ThisError)]
pub enum TokenError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("failed to sign token: {0}")]
    Sign(String),
}

#[derive(Debug, ThisError)]
pub enum JwsError {
    #[error("signed data must have 3 segments, got {0}")]
    SegmentCount(usize),

    #[error("invalid base64 in {segment}: {source}")]
    Base64 {
        segment: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("invalid JSON in {segment}: {source}")]
    Json {
        segment: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Error returned by [`crate::AppStoreClient`] operations.
#[derive(Debug, ThisError)]
pub enum AppStoreError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Jws(#[from] JwsError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppStoreError {
    /// The dispatch error, if the failure came from the remote call.
    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            AppStoreError::Dispatch(e) => Some(e),
            _ => None,
        }
    }
}
