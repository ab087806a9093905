//! Response bodies of the App Store Server API endpoints.

use serde::{Deserialize, Serialize};

use crate::enums::{Environment, SubscriptionStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfoResponse {
    pub signed_transaction_info: String,
}

/// https://developer.apple.com/documentation/appstoreserverapi/statusresponse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<SubscriptionGroupIdentifierItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscriptionGroupIdentifierItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_group_identifier: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub last_transactions: Vec<LastTransactionsItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LastTransactionsItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_renewal_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_transaction_info: Option<String>,
}

/// https://developer.apple.com/documentation/appstoreserverapi/historyresponse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signed_transactions: Vec<String>,
}

/// https://developer.apple.com/documentation/appstoreserverapi/orderlookupresponse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderLookupResponse {
    pub status: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signed_transactions: Vec<String>,
}

impl OrderLookupResponse {
    /// `status == 0` means the order id is valid.
    pub fn is_valid(&self) -> bool {
        self.status == 0
    }
}

/// https://developer.apple.com/documentation/appstoreserverapi/refundhistoryresponse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefundHistoryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signed_transactions: Vec<String>,
}
