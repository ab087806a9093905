use appstore_schema::ErrorResponse;
use reqwest::{Response, StatusCode};
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use crate::error::DispatchError;
use crate::transport::UPSTREAM_BODY_PREVIEW_CHARS;

/// How long a retryable error body may take before the retry goes ahead without it.
pub const RETRYABLE_BODY_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Verdict on one attempt.
#[derive(Debug, Default)]
pub struct RetryDecision {
    pub should_retry: bool,
    /// Transport and remote causes of this attempt, in that order.
    pub error: Option<DispatchError>,
}

impl RetryDecision {
    fn retry(error: DispatchError) -> Self {
        Self {
            should_retry: true,
            error: Some(error),
        }
    }
}

/// Statuses that are retried without looking at the body.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

/// True if the stream ended early anywhere in the error's source chain.
pub fn is_unexpected_eof(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::UnexpectedEof {
                return true;
            }
        }
        source = e.source();
    }
    false
}

/// Decide whether an attempt should be retried.
///
/// Any non-200 body is consumed to extract the remote error code, so only a 200 response is
/// handed back.
pub async fn classify(outcome: reqwest::Result<Response>) -> (RetryDecision, Option<Response>) {
    let resp = match outcome {
        Ok(resp) => resp,
        Err(err) => {
            let should_retry = is_unexpected_eof(&err);
            tracing::debug!(error = %err, should_retry, "Transport error");
            let decision = RetryDecision {
                should_retry,
                error: Some(DispatchError::new(err.status()).with(err)),
            };
            return (decision, None);
        }
    };

    let status = resp.status();
    if status == StatusCode::OK {
        return (RetryDecision::default(), Some(resp));
    }

    let retry_by_status = is_retryable_status(status);
    let mut error = DispatchError::new(Some(status));

    // A retryable status does not depend on the body, so a stalled body must not hold up the retry.
    let read = if retry_by_status {
        match tokio::time::timeout(RETRYABLE_BODY_READ_TIMEOUT, resp.bytes()).await {
            Ok(read) => read,
            Err(_) => {
                tracing::debug!(%status, "Error body stalled; retrying without it");
                return (RetryDecision::retry(error), None);
            }
        }
    } else {
        resp.bytes().await
    };

    let body = match read {
        Ok(body) => body,
        Err(err) => {
            let eof = is_unexpected_eof(&err);
            tracing::debug!(%status, error = %err, eof, "Failed to read error body");
            error.push(err);
            if retry_by_status || eof {
                return (RetryDecision::retry(error), None);
            }
            Default::default()
        }
    };

    let remote = ErrorResponse::from_body(status.as_u16(), &body);
    let should_retry = retry_by_status || remote.is_transient();

    tracing::debug!(
        %status,
        error_code = remote.error_code,
        should_retry,
        body = %format!(
            "{:.len$}",
            String::from_utf8_lossy(&body),
            len = UPSTREAM_BODY_PREVIEW_CHARS
        ),
        "Classified upstream error"
    );

    error.push(remote);
    let decision = RetryDecision {
        should_retry,
        error: Some(error),
    };
    (decision, None)
}
