// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for cache backends.
//!
//! A cache backend distinguishes "the key is absent" from "the backend itself
//! failed". Only the former is treated as a miss by the lookup paths; the
//! latter is propagated so an unavailable cache is never silently masked.

use super::SharedSource;
use std::sync::Arc;

/// Errors reported by a [`crate::cache::CacheBackend`].
///
/// # Examples
///
/// ```rust
/// use ipinfo_client::CacheError;
///
/// let miss = CacheError::not_found("8.8.8.8");
/// assert!(miss.is_not_found());
///
/// let down = CacheError::backend("redis", "connection refused");
/// assert!(!down.is_not_found());
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The key is not present (or has expired).
    #[error("Cache key not found: {key}")]
    NotFound {
        /// The key that was looked up
        key: String,
    },

    /// The key cannot be used with the cache (e.g. it is empty).
    #[error("Invalid cache key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// The backend failed to serve the request.
    ///
    /// For external caches this covers connectivity problems, serialization
    /// failures and similar operational issues.
    #[error("Cache backend {backend} failed: {message}")]
    Backend {
        /// Name of the backend that failed
        backend: String,
        /// Human-readable description of the failure
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<SharedSource>,
    },
}

impl CacheError {
    /// Create a `NotFound` error for `key`.
    pub fn not_found(key: impl Into<String>) -> Self {
        CacheError::NotFound { key: key.into() }
    }

    /// Create an `InvalidKey` error.
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        CacheError::InvalidKey {
            reason: reason.into(),
        }
    }

    /// Create a `Backend` error without an underlying source.
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::Backend {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Backend` error wrapping an underlying error.
    pub fn backend_with_source(
        backend: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CacheError::Backend {
            backend: backend.into(),
            message: source.to_string(),
            source: Some(Arc::new(source)),
        }
    }

    /// Returns `true` for the "key absent" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}
