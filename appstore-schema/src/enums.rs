//! Enumerated values of the App Store Server API.
//!
//! Integer-coded enums keep unrecognised values in an `Other` variant and string-coded enums
//! fall back to `Unknown`, so a newly documented value never fails a whole payload.

use serde::{Deserialize, Serialize};

macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i32", into = "i32")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value not known to this client.
            Other(i32),
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Other(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)+
                    $name::Other(other) => other,
                }
            }
        }
    };
}

int_enum! {
    /// https://developer.apple.com/documentation/appstoreserverapi/offertype
    pub enum OfferType {
        IntroductoryOffer = 1,
        PromotionalOffer = 2,
        SubscriptionOfferCode = 3,
        WinBackOffer = 4,
    }
}

int_enum! {
    /// https://developer.apple.com/documentation/appstoreserverapi/expirationintent
    pub enum ExpirationIntent {
        CanceledSubscription = 1,
        BillingError = 2,
        NotConsentPriceIncrease = 3,
        ProductNotAvailable = 4,
        OtherReason = 5,
    }
}

int_enum! {
    /// https://developer.apple.com/documentation/appstoreserverapi/status
    pub enum SubscriptionStatus {
        Active = 1,
        Expired = 2,
        BillingRetryPeriod = 3,
        BillingGracePeriod = 4,
        Revoked = 5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    Sandbox,
    Production,
    Xcode,
    LocalTesting,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InAppOwnershipType {
    FamilyShared,
    Purchased,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "Auto-Renewable Subscription")]
    AutoRenewableSubscription,
    #[serde(rename = "Non-Consumable")]
    NonConsumable,
    #[serde(rename = "Consumable")]
    Consumable,
    #[serde(rename = "Non-Renewing Subscription")]
    NonRenewingSubscription,
    #[serde(other)]
    Unknown,
}
