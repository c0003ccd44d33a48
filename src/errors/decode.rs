// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for decoding API payloads into records.

use super::SharedSource;
use std::sync::Arc;

/// Errors that can occur while decoding a response payload.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// The payload for `key` is not valid JSON for the expected record.
    #[error("Failed to decode {expected} for {key}")]
    Json {
        /// Lookup key whose payload failed to decode
        key: String,
        /// Name of the record type that was expected
        expected: &'static str,
        /// The underlying JSON error
        #[source]
        source: SharedSource,
    },

    /// A plain-text payload was not valid UTF-8.
    #[error("Response for {key} is not valid UTF-8 text")]
    Text {
        /// Lookup key whose payload failed to decode
        key: String,
    },

    /// A cached value has a different shape than the operation expects.
    #[error("Cached value for {key} is a {found}, expected {expected}")]
    UnexpectedShape {
        /// Lookup key of the cached value
        key: String,
        /// Shape the operation expected
        expected: &'static str,
        /// Shape that was found
        found: &'static str,
    },
}

impl DecodeError {
    /// Helper to create a `Json` error from a `serde_json` failure.
    pub fn json(key: impl Into<String>, expected: &'static str, source: serde_json::Error) -> Self {
        DecodeError::Json {
            key: key.into(),
            expected,
            source: Arc::new(source),
        }
    }
}
