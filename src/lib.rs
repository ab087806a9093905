//! Client for Apple's App Store Server API.
//!
//! Requests go through [`transport::Dispatcher`], which retries transient failures with
//! exponential backoff and full jitter until success, a permanent error, or cancellation of the
//! caller's [`CallContext`].

pub mod config;
pub mod error;
pub mod jws;
pub mod logging;
pub mod service;
pub mod token;
pub mod transport;

pub use appstore_schema as schema;
pub use config::ClientConfig;
pub use error::{AppStoreError, DispatchCause, DispatchError};
pub use service::{ApiEnvironment, AppStoreClient};
pub use token::{BearerSource, StaticBearer, TokenIssuer};
pub use transport::{Backoff, BackoffConfig, CallContext, CancelReason, Dispatcher};
