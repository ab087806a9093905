mod endpoints;

pub use endpoints::ApiEnvironment;

use appstore_schema::{
    HistoryResponse, JwsTransaction, OrderLookupResponse, RefundHistoryResponse, StatusResponse,
    SubscriptionStatus, TransactionInfoResponse,
};
use reqwest::Request;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{AppStoreError, ConfigError, DispatchError};
use crate::jws;
use crate::token::BearerSource;
use crate::transport::{CallContext, Dispatcher};

/// Client for the App Store Server API.
///
/// Cheap to clone; clones share the HTTP connection pool and bearer source.
#[derive(Clone)]
pub struct AppStoreClient {
    dispatcher: Dispatcher,
    base_url: Url,
    bearer: Arc<dyn BearerSource>,
    retry: bool,
}

impl std::fmt::Debug for AppStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl AppStoreClient {
    /// `base_url` must end with `/` (see [`ClientConfig::base_url`]).
    pub fn new(dispatcher: Dispatcher, base_url: Url, bearer: Arc<dyn BearerSource>) -> Self {
        Self {
            dispatcher,
            base_url,
            bearer,
            retry: true,
        }
    }

    /// Build from configuration, signing tokens with the configured key.
    pub fn from_config(cfg: &ClientConfig) -> Result<Self, AppStoreError> {
        let issuer = cfg.token.issuer()?;
        Self::from_config_with_bearer(cfg, Arc::new(issuer))
    }

    /// Build from configuration with an externally managed bearer source.
    pub fn from_config_with_bearer(
        cfg: &ClientConfig,
        bearer: Arc<dyn BearerSource>,
    ) -> Result<Self, AppStoreError> {
        cfg.log_effective();
        let client = Self::new(cfg.dispatcher()?, cfg.base_url()?, bearer);
        Ok(client.with_retry(cfg.retry.enabled))
    }

    /// Disable to send every request exactly once.
    pub fn with_retry(mut self, enabled: bool) -> Self {
        self.retry = enabled;
        self
    }

    /// https://developer.apple.com/documentation/appstoreserverapi/get_transaction_info
    pub async fn transaction_info(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
    ) -> Result<JwsTransaction, AppStoreError> {
        let url = self.endpoint(&endpoints::TRANSACTIONS, transaction_id)?;
        let resp: TransactionInfoResponse = self.get_json(ctx, "transaction_info", url).await?;
        Ok(jws::decode_transaction(&resp.signed_transaction_info)?)
    }

    /// https://developer.apple.com/documentation/appstoreserverapi/get_all_subscription_statuses
    ///
    /// An empty `status` filter returns every status.
    pub async fn all_subscription_statuses(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
        status: &[SubscriptionStatus],
    ) -> Result<StatusResponse, AppStoreError> {
        let mut url = self.endpoint(&endpoints::SUBSCRIPTIONS, transaction_id)?;
        if !status.is_empty() {
            let mut query = url.query_pairs_mut();
            for s in status {
                query.append_pair("status", &i32::from(*s).to_string());
            }
        }
        self.get_json(ctx, "all_subscription_statuses", url).await
    }

    /// https://developer.apple.com/documentation/appstoreserverapi/get_transaction_history
    pub async fn transaction_history(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
        revision: Option<&str>,
    ) -> Result<HistoryResponse, AppStoreError> {
        let mut url = self.endpoint(&endpoints::HISTORY, transaction_id)?;
        if let Some(revision) = revision {
            url.query_pairs_mut().append_pair("revision", revision);
        }
        self.get_json(ctx, "transaction_history", url).await
    }

    /// https://developer.apple.com/documentation/appstoreserverapi/look_up_order_id
    pub async fn look_up_order(
        &self,
        ctx: &CallContext,
        order_id: &str,
    ) -> Result<OrderLookupResponse, AppStoreError> {
        let url = self.endpoint(&endpoints::ORDER_LOOKUP, order_id)?;
        self.get_json(ctx, "look_up_order", url).await
    }

    /// https://developer.apple.com/documentation/appstoreserverapi/get_refund_history
    pub async fn refund_history(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
        revision: Option<&str>,
    ) -> Result<RefundHistoryResponse, AppStoreError> {
        let mut url = self.endpoint(&endpoints::REFUND_LOOKUP, transaction_id)?;
        if let Some(revision) = revision {
            url.query_pairs_mut().append_pair("revision", revision);
        }
        self.get_json(ctx, "refund_history", url).await
    }

    fn endpoint(&self, prefix: &[&str], id: &str) -> Result<Url, AppStoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(prefix)
            .push(id);
        Ok(url)
    }

    fn build_get(&self, url: Url) -> Result<Request, AppStoreError> {
        let bearer = self.bearer.bearer()?;
        Ok(self
            .dispatcher
            .client()
            .get(url)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
            .build()?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        url: Url,
    ) -> Result<T, AppStoreError> {
        tracing::debug!(operation, url = %url, retry = self.retry, "Calling App Store Server API");

        let request = self.build_get(url)?;
        let resp = if self.retry {
            self.dispatcher.send(ctx, request, None).await
        } else {
            self.dispatcher.send_once(ctx, request).await
        };

        let resp = match resp {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(
                    operation,
                    status = ?err.status(),
                    error_code = err.remote().map(|e| e.error_code),
                    cancelled = err.is_cancelled(),
                    "App Store Server API call failed"
                );
                return Err(err.into());
            }
        };

        let body = tokio::select! {
            biased;
            reason = ctx.cancelled() => {
                return Err(DispatchError::cancelled(reason, None).into());
            }
            body = resp.bytes() => body?,
        };
        Ok(serde_json::from_slice(&body)?)
    }
}
