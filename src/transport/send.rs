use appstore_schema::ErrorResponse;
use reqwest::{Request, Response, StatusCode};
use std::time::Duration;

use super::backoff::{Backoff, BackoffConfig};
use super::classify::classify;
use super::context::CallContext;
use crate::error::DispatchError;

/// Sends requests, retrying transient failures until success or cancellation.
///
/// There is no attempt limit: only a non-retryable outcome or the caller's [`CallContext`] ends
/// the loop.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    backoff: BackoffConfig,
}

impl Dispatcher {
    pub fn new(client: reqwest::Client, backoff: BackoffConfig) -> Self {
        Self { client, backoff }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn backoff_config(&self) -> BackoffConfig {
        self.backoff
    }

    /// Send `request`, retrying per the classifier.
    ///
    /// Without an explicit `backoff`, a fresh generator is built from the dispatcher's config.
    /// The returned response body belongs to the caller.
    pub async fn send(
        &self,
        ctx: &CallContext,
        request: Request,
        backoff: Option<&mut dyn Backoff>,
    ) -> Result<Response, DispatchError> {
        let mut fallback;
        let backoff: &mut dyn Backoff = match backoff {
            Some(backoff) => backoff,
            None => {
                fallback = self.backoff.build();
                &mut fallback
            }
        };

        let method = request.method().clone();
        let url = request.url().clone();
        let mut request = Some(request);
        let mut pending: Option<DispatchError> = None;
        let mut pause = Duration::ZERO;
        let mut attempt = 0u32;

        loop {
            tokio::select! {
                biased;
                reason = ctx.cancelled() => {
                    return Err(DispatchError::cancelled(reason, pending));
                }
                () = tokio::time::sleep(pause) => {}
            }

            if let Some(reason) = ctx.cancel_reason() {
                return Err(DispatchError::cancelled(reason, pending));
            }

            // Keep the original for the next attempt; a body that cannot be replayed is sent once.
            let Some(current) = request.take() else {
                break;
            };
            let (this_attempt, replayable) = match current.try_clone() {
                Some(copy) => {
                    request = Some(current);
                    (copy, true)
                }
                None => (current, false),
            };

            attempt += 1;
            tracing::debug!(%method, %url, attempt, "Dispatching request");

            let outcome = tokio::select! {
                biased;
                reason = ctx.cancelled() => {
                    return Err(DispatchError::cancelled(reason, pending));
                }
                outcome = async { classify(self.client.execute(this_attempt).await).await } => outcome,
            };

            let (decision, resp) = outcome;
            if !decision.should_retry || !replayable {
                if decision.should_retry {
                    tracing::warn!(%method, %url, attempt, "Request body is not replayable; not retrying");
                }
                return match (resp, decision.error) {
                    (_, Some(err)) => Err(err),
                    (Some(resp), None) => Ok(resp),
                    (None, None) => Err(DispatchError::new(None)),
                };
            }

            pause = backoff.next_pause();
            if let Some(err) = &decision.error {
                tracing::warn!(
                    %method,
                    %url,
                    attempt,
                    status = ?err.status(),
                    ?pause,
                    "Retrying after error {}",
                    err
                );
            }
            // A retryable attempt never carries a response; its body was already consumed.
            drop(resp);
            pending = decision.error;
        }

        Err(pending.unwrap_or_else(|| DispatchError::new(None)))
    }

    /// Send `request` exactly once. Any non-200 status becomes a remote error.
    pub async fn send_once(
        &self,
        ctx: &CallContext,
        request: Request,
    ) -> Result<Response, DispatchError> {
        if let Some(reason) = ctx.cancel_reason() {
            return Err(DispatchError::cancelled(reason, None));
        }

        let resp = tokio::select! {
            biased;
            reason = ctx.cancelled() => {
                return Err(DispatchError::cancelled(reason, None));
            }
            resp = self.client.execute(request) => resp,
        };

        let resp = match resp {
            Ok(resp) => resp,
            Err(err) => {
                let err = DispatchError::new(err.status()).with(err);
                return Err(match ctx.cancel_reason() {
                    Some(reason) => DispatchError::cancelled(reason, Some(err)),
                    None => err,
                });
            }
        };

        let status = resp.status();
        if status == StatusCode::OK {
            return Ok(resp);
        }

        let mut error = DispatchError::new(Some(status));
        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(err) => {
                error.push(err);
                Default::default()
            }
        };
        error.push(ErrorResponse::from_body(status.as_u16(), &body));
        Err(error)
    }
}
