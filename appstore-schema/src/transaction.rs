use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Environment, InAppOwnershipType, OfferType, TransactionType};
use crate::envelope::SignedEnvelope;
use crate::millis_to_utc;

pub type JwsTransaction = SignedEnvelope<JwsTransactionDecodedPayload>;

/// https://developer.apple.com/documentation/appstoreserverapi/jwstransactiondecodedpayload
///
/// Dates are milliseconds since the UNIX epoch; `0` means the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JwsTransactionDecodedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_account_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    pub expires_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_app_ownership_type: Option<InAppOwnershipType>,
    pub is_upgraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<OfferType>,
    pub original_purchase_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub purchase_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    pub revocation_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<i32>,
    pub signed_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storefront: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storefront_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_group_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_order_line_item_id: Option<String>,
    /// Price in milliunits of `currency`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl JwsTransactionDecodedPayload {
    pub fn purchase_time(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.purchase_date)
    }

    pub fn expires_time(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.expires_date)
    }

    pub fn signed_time(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.signed_date)
    }

    pub fn revocation_time(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.revocation_date)
    }

    pub fn is_revoked(&self) -> bool {
        self.revocation_date != 0
    }
}
