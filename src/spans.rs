//! Span creation helpers for client operations.
//!
//! Telemetry concerns are kept out of the business logic: instead of using
//! `#[instrument]` attributes directly on functions, each instrumented
//! operation has a corresponding span helper function in this module.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, key: &str) -> Result<T, IpinfoError> {
//!     let span = spans::lookup("my_operation", key);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use tracing::{Level, Span};

/// Create span for a single-key lookup.
///
/// Parent: caller's span
/// Children: `api_call` span of the logging layer, if installed
#[inline]
pub(crate) fn lookup(operation: &'static str, key: &str) -> Span {
    tracing::debug_span!("ipinfo.lookup", operation = operation, key = %key)
}

/// Create span for a batch lookup.
///
/// This is the root span of one `get_batch` call.
///
/// Parent: None (root span for this operation)
/// Children: batch_chunk spans (one per dispatched chunk)
#[inline]
pub(crate) fn batch(keys: usize, batch_size: u32) -> Span {
    tracing::span!(
        Level::INFO,
        "ipinfo.batch",
        keys = keys,
        batch_size = batch_size,
        cached = tracing::field::Empty,
        chunks = tracing::field::Empty,
    )
}

/// Create span for one chunk of a batch lookup.
///
/// Parent: batch span
#[inline]
pub(crate) fn batch_chunk(index: usize, keys: usize) -> Span {
    tracing::debug_span!("ipinfo.batch_chunk", chunk = index, keys = keys)
}
