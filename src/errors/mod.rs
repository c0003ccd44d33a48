// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the ipinfo-client library.
//!
//! This module provides strongly-typed errors for all public APIs.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling ([`CacheError`],
//!   [`ApiError`], [`DecodeError`])
//! - **Unified error type** ([`IpinfoError`]) for convenience when you don't need
//!   to distinguish between error sources
//!
//! All error types are `Clone`: the single-flight cache hands the outcome of
//! one computation to every caller that was waiting on it, errors included.
//! Underlying sources are therefore held behind an `Arc`.
//!
//! # Examples
//!
//! ```rust,ignore
//! use ipinfo_client::{ApiError, Client, IpinfoError};
//!
//! async fn example(client: &Client) {
//!     match client.get_asn_details("AS15169").await {
//!         Ok(details) => println!("{}", details.name),
//!         Err(IpinfoError::Api(ApiError::Status { status: 429, .. })) => {
//!             eprintln!("Quota exhausted");
//!         }
//!         Err(IpinfoError::Cache(e)) => eprintln!("Cache unavailable: {e}"),
//!         Err(e) => eprintln!("Other error: {e}"),
//!     }
//! }
//! ```

mod api;
mod cache;
mod decode;

pub use api::ApiError;
pub use cache::CacheError;
pub use decode::DecodeError;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Shared, cloneable error source.
pub type SharedSource = Arc<dyn std::error::Error + Send + Sync>;

/// Which deadline of a batch operation elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutScope {
    /// A single chunk exceeded its own deadline.
    Chunk,
    /// The overall batch deadline elapsed.
    Total,
}

impl fmt::Display for TimeoutScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutScope::Chunk => write!(f, "chunk"),
            TimeoutScope::Total => write!(f, "total"),
        }
    }
}

/// Unified error type for all client operations.
///
/// Module-specific error types convert into `IpinfoError` via `From`, so `?`
/// propagates them naturally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IpinfoError {
    /// Error from the cache backend (never `NotFound` on lookup paths).
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from the HTTP executor.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Error decoding a response payload.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The given string is not an ASN identifier (`AS` followed by digits).
    #[error("Invalid ASN: {asn}")]
    InvalidAsn {
        /// The rejected input
        asn: String,
    },

    /// The input to an operation violates its preconditions.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Why the input was rejected
        reason: String,
    },

    /// A batch deadline elapsed before the affected requests completed.
    #[error("Batch {scope} timeout after {after:?}")]
    Timeout {
        /// Which deadline elapsed
        scope: TimeoutScope,
        /// The deadline that elapsed
        after: Duration,
    },
}

impl IpinfoError {
    /// Create an `InvalidAsn` error.
    pub fn invalid_asn(asn: impl Into<String>) -> Self {
        IpinfoError::InvalidAsn { asn: asn.into() }
    }

    /// Create an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        IpinfoError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error is a timeout, either from a batch deadline
    /// or from the executor's own request deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            IpinfoError::Timeout { .. } | IpinfoError::Api(ApiError::Timeout { .. })
        )
    }
}
