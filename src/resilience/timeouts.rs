//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race an upstream exchange against a deadline
//! - Cancel the exchange when the deadline wins
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the losing future is dropped, which
//!   aborts the in-flight request and anything chained after it
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::ProxyError;

/// Run `operation` with a deadline of `limit`.
pub async fn with_timeout<F, T>(limit: Duration, operation: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, ProxyError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(ProxyError::Timeout(limit)),
    }
}
