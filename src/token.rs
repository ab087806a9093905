//! Bearer tokens for the App Store Server API.
//!
//! See https://developer.apple.com/documentation/appstoreserverapi/generating_json_web_tokens_for_api_requests

use jwt_simple::prelude::{Claims, Duration, ECDSAP256KeyPairLike, ES256KeyPair};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

pub const AUDIENCE: &str = "appstoreconnect-v1";

/// Tokens older than an hour are rejected by the API.
pub const MAX_TTL_SECS: u64 = 3600;

/// Produces the credential sent as `Authorization: Bearer <token>`.
pub trait BearerSource: Send + Sync {
    fn bearer(&self) -> Result<String, TokenError>;
}

/// A token issued elsewhere.
#[derive(Debug, Clone)]
pub struct StaticBearer(pub String);

impl BearerSource for StaticBearer {
    fn bearer(&self) -> Result<String, TokenError> {
        Ok(self.0.clone())
    }
}

/// Custom claims carried next to `iss`, `iat`, `exp` and `aud`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleClaims {
    pub bid: String,
}

/// Signs short-lived ES256 tokens with an App Store Connect API key.
pub struct TokenIssuer {
    key_pair: ES256KeyPair,
    issuer_id: String,
    bundle_id: String,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key_id", &self.key_pair.key_id())
            .field("issuer_id", &self.issuer_id)
            .field("bundle_id", &self.bundle_id)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Load the PKCS#8 PEM (`.p8`) key downloaded from App Store Connect.
    pub fn from_pem(
        pem: &str,
        key_id: &str,
        issuer_id: &str,
        bundle_id: &str,
        ttl_secs: u64,
    ) -> Result<Self, TokenError> {
        let key_pair =
            ES256KeyPair::from_pem(pem).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self::from_key_pair(
            key_pair, key_id, issuer_id, bundle_id, ttl_secs,
        ))
    }

    /// `ttl_secs` is clamped to `1..=MAX_TTL_SECS`.
    pub fn from_key_pair(
        key_pair: ES256KeyPair,
        key_id: &str,
        issuer_id: &str,
        bundle_id: &str,
        ttl_secs: u64,
    ) -> Self {
        Self {
            key_pair: key_pair.with_key_id(key_id),
            issuer_id: issuer_id.to_string(),
            bundle_id: bundle_id.to_string(),
            ttl_secs: ttl_secs.clamp(1, MAX_TTL_SECS),
        }
    }

    pub fn issue(&self) -> Result<String, TokenError> {
        let mut claims = Claims::with_custom_claims(
            BundleClaims {
                bid: self.bundle_id.clone(),
            },
            Duration::from_secs(self.ttl_secs),
        )
        .with_issuer(&self.issuer_id)
        .with_audience(AUDIENCE);
        // The API does not accept `nbf`.
        claims.invalid_before = None;

        let token = self
            .key_pair
            .sign(claims)
            .map_err(|e| TokenError::Sign(e.to_string()))?;
        tracing::trace!(issuer = %self.issuer_id, ttl_secs = self.ttl_secs, "Issued bearer token");
        Ok(token)
    }
}

impl BearerSource for TokenIssuer {
    fn bearer(&self) -> Result<String, TokenError> {
        self.issue()
    }
}
