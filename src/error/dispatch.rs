use appstore_schema::ErrorResponse;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error as ThisError;

use crate::transport::CancelReason;

/// One underlying cause of a failed dispatch.
#[derive(Debug, ThisError)]
pub enum DispatchCause {
    /// Network-level failure before or while reading a response.
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Structured error decoded from the response body.
    #[error(transparent)]
    Remote(#[from] ErrorResponse),

    #[error("{0}")]
    Cancelled(CancelReason),
}

/// Joined error of a dispatch: ordered causes of the most recent attempt, plus the cancellation
/// cause (first) when the call stopped because its context was cancelled.
#[derive(Debug, Default)]
pub struct DispatchError {
    status: Option<StatusCode>,
    causes: Vec<DispatchCause>,
}

impl DispatchError {
    pub(crate) fn new(status: Option<StatusCode>) -> Self {
        Self {
            status,
            causes: Vec::new(),
        }
    }

    pub(crate) fn cancelled(reason: CancelReason, pending: Option<DispatchError>) -> Self {
        let mut err = DispatchError::new(pending.as_ref().and_then(|p| p.status));
        err.push(DispatchCause::Cancelled(reason));
        if let Some(pending) = pending {
            err.causes.extend(pending.causes);
        }
        err
    }

    pub(crate) fn push(&mut self, cause: impl Into<DispatchCause>) {
        self.causes.push(cause.into());
    }

    pub(crate) fn with(mut self, cause: impl Into<DispatchCause>) -> Self {
        self.push(cause);
        self
    }

    /// Status of the last response seen, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn causes(&self) -> &[DispatchCause] {
        &self.causes
    }

    pub fn into_causes(self) -> Vec<DispatchCause> {
        self.causes
    }

    pub fn transport(&self) -> Option<&reqwest::Error> {
        self.causes.iter().find_map(|cause| match cause {
            DispatchCause::Transport(e) => Some(e),
            _ => None,
        })
    }

    pub fn remote(&self) -> Option<&ErrorResponse> {
        self.causes.iter().find_map(|cause| match cause {
            DispatchCause::Remote(e) => Some(e),
            _ => None,
        })
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.causes.iter().find_map(|cause| match cause {
            DispatchCause::Cancelled(reason) => Some(*reason),
            _ => None,
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason().is_some()
    }

    /// True if a decoded remote error carries `code`.
    pub fn has_error_code(&self, code: i64) -> bool {
        self.remote().is_some_and(|e| e.error_code == code)
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.causes.is_empty() {
            return match self.status {
                Some(status) => write!(f, "request failed with status {status}"),
                None => f.write_str("request failed"),
            };
        }
        for (i, cause) in self.causes.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
