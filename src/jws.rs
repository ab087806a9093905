use appstore_schema::{
    JwsDecodedHeader, JwsRenewalInfo, JwsTransaction, SignedEnvelope,
};
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use serde::de::DeserializeOwned;

use crate::error::JwsError;

/// Split a signed envelope and decode its header and payload.
///
/// The signature is returned as-is and is not verified.
pub fn decode_signed<P: DeserializeOwned>(signed: &str) -> Result<SignedEnvelope<P>, JwsError> {
    let segments: Vec<&str> = signed.split('.').collect();
    let [header, payload, signature] = segments[..] else {
        return Err(JwsError::SegmentCount(segments.len()));
    };

    let header: JwsDecodedHeader = decode_segment("header", header)?;
    let payload: P = decode_segment("payload", payload)?;

    Ok(SignedEnvelope {
        header,
        payload,
        signature: signature.to_string(),
    })
}

pub fn decode_transaction(signed: &str) -> Result<JwsTransaction, JwsError> {
    decode_signed(signed)
}

pub fn decode_renewal_info(signed: &str) -> Result<JwsRenewalInfo, JwsError> {
    decode_signed(signed)
}

fn decode_segment<T: DeserializeOwned>(segment: &'static str, raw: &str) -> Result<T, JwsError> {
    // JWS segments are base64url without padding; tolerate padded and standard alphabets too.
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .or_else(|_| URL_SAFE.decode(raw))
        .or_else(|_| STANDARD.decode(raw))
        .map_err(|source| JwsError::Base64 { segment, source })?;

    serde_json::from_slice(&bytes).map_err(|source| JwsError::Json { segment, source })
}
