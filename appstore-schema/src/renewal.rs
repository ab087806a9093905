use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Environment, ExpirationIntent, OfferType};
use crate::envelope::SignedEnvelope;
use crate::millis_to_utc;

pub type JwsRenewalInfo = SignedEnvelope<JwsRenewalInfoDecodedPayload>;

/// https://developer.apple.com/documentation/appstoreserverapi/jwsrenewalinfodecodedpayload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JwsRenewalInfoDecodedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renew_product_id: Option<String>,
    pub auto_renew_status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_intent: Option<ExpirationIntent>,
    pub grace_period_expires_date: i64,
    pub is_in_billing_retry_period: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<OfferType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,
    pub price_increase_status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub recent_subscription_start_date: i64,
    pub renewal_date: i64,
    pub signed_date: i64,
}

impl JwsRenewalInfoDecodedPayload {
    pub fn renewal_time(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.renewal_date)
    }

    pub fn grace_period_expires_time(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.grace_period_expires_date)
    }

    pub fn is_auto_renew(&self) -> bool {
        self.auto_renew_status == 1
    }

    pub fn is_consented_price_increase(&self) -> bool {
        self.price_increase_status == 1
    }
}
