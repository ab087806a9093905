use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static PRODUCTION_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.storekit.itunes.apple.com/inApps/").expect("valid production URL")
});

static SANDBOX_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.storekit-sandbox.itunes.apple.com/inApps/").expect("valid sandbox URL")
});

/// Remote environment the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiEnvironment {
    #[default]
    Production,
    Sandbox,
}

impl ApiEnvironment {
    pub fn base_url(self) -> Url {
        match self {
            ApiEnvironment::Production => PRODUCTION_BASE_URL.clone(),
            ApiEnvironment::Sandbox => SANDBOX_BASE_URL.clone(),
        }
    }
}

pub(crate) const TRANSACTIONS: [&str; 2] = ["v1", "transactions"];
pub(crate) const SUBSCRIPTIONS: [&str; 2] = ["v1", "subscriptions"];
pub(crate) const HISTORY: [&str; 2] = ["v1", "history"];
pub(crate) const ORDER_LOOKUP: [&str; 2] = ["v1", "lookup"];
pub(crate) const REFUND_LOOKUP: [&str; 3] = ["v2", "refund", "lookup"];
