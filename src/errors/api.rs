// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared error types for HTTP API operations.
//!
//! This module provides error types for failures that can occur while
//! executing a request against the lookup service, independent of which
//! executor performed it.

use super::SharedSource;
use std::sync::Arc;
use std::time::Duration;

/// Errors that can occur while executing an API request.
///
/// The variants separate "the service answered with a non-2xx status" from
/// "we never got a usable answer" (connectivity, deadline), so callers can
/// decide for themselves which ones are worth retrying.
///
/// # Examples
///
/// ```rust
/// use ipinfo_client::ApiError;
///
/// let error = ApiError::status(429, "Rate limit exceeded", "Upgrade your plan");
/// assert_eq!(error.status_code(), Some(429));
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The service answered with a status outside the 2xx range.
    #[error("API returned status {status}: {title}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error title from the response body (empty if none was provided)
        title: String,
        /// Error message from the response body (empty if none was provided)
        message: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("Transport failure during {operation}")]
    Transport {
        /// Description of the operation that failed (e.g. "GET 8.8.8.8/json")
        operation: String,
        /// The underlying transport error
        #[source]
        source: SharedSource,
    },

    /// The request did not complete within its deadline.
    #[error("Request {operation} timed out after {after:?}")]
    Timeout {
        /// Description of the operation that timed out
        operation: String,
        /// The deadline that elapsed
        after: Duration,
    },

    /// The request path could not be resolved against the base URL.
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl {
        /// The URL or path that failed to resolve
        url: String,
        /// Why it failed
        reason: String,
    },

    /// The request body could not be encoded.
    #[error("Failed to encode request body for {operation}")]
    Encode {
        /// Description of the operation
        operation: String,
        /// The underlying serialization error
        #[source]
        source: SharedSource,
    },
}

impl ApiError {
    /// Helper to create a `Status` error.
    pub fn status(status: u16, title: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Helper to create a `Transport` error from any error type.
    pub fn transport(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::Transport {
            operation: operation.into(),
            source: Arc::new(source),
        }
    }

    /// Helper to create a `Timeout` error.
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        ApiError::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Helper to create an `Encode` error from any error type.
    pub fn encode(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::Encode {
            operation: operation.into(),
            source: Arc::new(source),
        }
    }

    /// Returns the HTTP status code for `Status` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
