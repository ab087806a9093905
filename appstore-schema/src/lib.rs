pub mod enums;
pub mod error;
pub mod envelope;
pub mod renewal;
pub mod responses;
pub mod transaction;

pub use enums::{
    Environment, ExpirationIntent, InAppOwnershipType, OfferType, SubscriptionStatus,
    TransactionType,
};
pub use envelope::{JwsDecodedHeader, SignedEnvelope};
pub use error::{ErrorResponse, TRANSIENT_ERROR_CODES};
pub use renewal::{JwsRenewalInfo, JwsRenewalInfoDecodedPayload};
pub use responses::{
    HistoryResponse, LastTransactionsItem, OrderLookupResponse, RefundHistoryResponse,
    StatusResponse, SubscriptionGroupIdentifierItem, TransactionInfoResponse,
};
pub use transaction::{JwsTransaction, JwsTransactionDecodedPayload};

use chrono::{DateTime, Utc};

/// Convert an App Store millisecond timestamp into a UTC datetime.
///
/// The API uses `0`/absent for "not set", which maps to `None`.
pub(crate) fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    if millis == 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis)
}
