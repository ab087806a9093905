use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Account not found; retry may succeed once data propagates.
pub const ACCOUNT_NOT_FOUND_RETRYABLE: i64 = 4_040_002;
/// App not found; retry may succeed once data propagates.
pub const APP_NOT_FOUND_RETRYABLE: i64 = 4_040_004;
/// Original transaction id not found; retry may succeed once data propagates.
pub const ORIGINAL_TRANSACTION_ID_NOT_FOUND_RETRYABLE: i64 = 4_040_006;
/// Server busy.
pub const GENERAL_INTERNAL_RETRYABLE: i64 = 5_000_001;

/// Error codes the API documents as transient.
///
/// See https://developer.apple.com/documentation/appstoreserverapi/error_codes
pub const TRANSIENT_ERROR_CODES: [i64; 4] = [
    ACCOUNT_NOT_FOUND_RETRYABLE,
    APP_NOT_FOUND_RETRYABLE,
    ORIGINAL_TRANSACTION_ID_NOT_FOUND_RETRYABLE,
    GENERAL_INTERNAL_RETRYABLE,
];

/// Structured error body returned by the API.
///
/// `http_status` is not part of the wire body; callers fill it from the response status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[serde(rename_all = "camelCase")]
#[error("app store error: status={http_status}, code={error_code}, message={error_message:?}")]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "is_zero_u16")]
    pub http_status: u16,

    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub error_code: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,
}

impl ErrorResponse {
    /// Decode an error body, degrading to an empty error when the body is not the expected JSON.
    pub fn from_body(http_status: u16, body: &[u8]) -> Self {
        let mut decoded = serde_json::from_slice::<ErrorResponse>(body).unwrap_or_default();
        decoded.http_status = http_status;
        decoded
    }

    pub fn is_transient(&self) -> bool {
        TRANSIENT_ERROR_CODES.contains(&self.error_code)
    }
}

fn is_zero_u16(v: &u16) -> bool {
    *v == 0
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}
