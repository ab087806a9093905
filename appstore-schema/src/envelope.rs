use serde::{Deserialize, Serialize};

/// https://developer.apple.com/documentation/appstoreserverapi/jwsdecodedheader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsDecodedHeader {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alg: String,

    /// Certificate chain, leaf first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x5c: Vec<String>,
}

/// A decoded three-part signed envelope.
///
/// The signature segment is kept verbatim; it is not verified.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedEnvelope<P> {
    pub header: JwsDecodedHeader,
    pub payload: P,
    pub signature: String,
}
