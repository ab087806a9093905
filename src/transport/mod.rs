//! Resilient request delivery: backoff, retry classification and the dispatch loop.

mod backoff;
mod classify;
mod context;
mod send;

pub use backoff::{Backoff, BackoffConfig, DEFAULT_INITIAL_BACKOFF, ExponentialJitter};
pub use classify::{
    RETRYABLE_BODY_READ_TIMEOUT, RetryDecision, classify, is_retryable_status, is_unexpected_eof,
};
pub use context::{CallContext, CancelReason};
pub use send::Dispatcher;

/// Max characters of an upstream body echoed into logs.
pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;
