use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::token::{MAX_TTL_SECS, TokenIssuer};

/// App Store Connect API key settings used to sign bearer tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Issuer id from the Keys page in App Store Connect.
    /// TOML: `token.issuer_id`.
    #[serde(default)]
    pub issuer_id: String,

    /// Private key id.
    /// TOML: `token.key_id`.
    #[serde(default)]
    pub key_id: String,

    /// Bundle id of the app.
    /// TOML: `token.bundle_id`.
    #[serde(default)]
    pub bundle_id: String,

    /// Path to the `.p8` private key. Ignored when `private_key` is set.
    /// TOML: `token.private_key_path`.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Inline PEM private key, convenient for `APPSTORE_TOKEN__PRIVATE_KEY`.
    #[serde(default, skip_serializing)]
    pub private_key: Option<String>,

    /// Token lifetime in seconds, at most 3600.
    /// TOML: `token.ttl_secs`. Default: `1200`.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer_id: String::new(),
            key_id: String::new(),
            bundle_id: String::new(),
            private_key_path: None,
            private_key: None,
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl TokenConfig {
    pub fn issuer(&self) -> Result<TokenIssuer, ConfigError> {
        for (name, value) in [
            ("issuer_id", &self.issuer_id),
            ("key_id", &self.key_id),
            ("bundle_id", &self.bundle_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingTokenField(name));
            }
        }
        if self.ttl_secs == 0 || self.ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::InvalidTokenTtl(self.ttl_secs));
        }

        let pem = match (&self.private_key, &self.private_key_path) {
            (Some(pem), _) => pem.clone(),
            (None, Some(path)) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::ReadKey {
                    path: path.clone(),
                    source,
                })?
            }
            (None, None) => return Err(ConfigError::MissingTokenField("private_key_path")),
        };

        Ok(TokenIssuer::from_pem(
            &pem,
            &self.key_id,
            &self.issuer_id,
            &self.bundle_id,
            self.ttl_secs,
        )?)
    }
}

fn default_ttl_secs() -> u64 {
    1200
}
