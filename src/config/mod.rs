// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the lookup client
//!
//! [`ClientConfig`] carries the connection settings shared by every request:
//! where the service lives, how to authenticate, and how long to wait.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use ipinfo_client::ClientConfig;
//!
//! // Anonymous access to https://ipinfo.io/, 30 second timeout
//! let config = ClientConfig::default();
//! assert!(config.token.is_none());
//! ```
//!
//! # Example: From the environment
//!
//! ```rust,no_run
//! use ipinfo_client::ClientConfig;
//!
//! // Reads IPINFO_TOKEN and IPINFO_BASE_URL
//! let config = ClientConfig::from_env();
//! ```

use std::time::Duration;

use tracing::debug;

pub mod constants;

use constants::{
    BASE_URL_ENV_VAR, DEFAULT_BASE_URL, DEFAULT_LITE_BASE_URL, DEFAULT_LOOKUP_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT, TOKEN_ENV_VAR, USER_AGENT,
};

/// Connection settings for the lookup client
///
/// Use [`crate::ClientBuilder`] for a fluent API that also configures the
/// cache and the HTTP executor.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL every request path is resolved against
    /// Default: `https://ipinfo.io/`
    pub base_url: String,

    /// Base URL of lite tier lookups
    /// Default: `https://api.ipinfo.io/lite/`
    pub lite_base_url: String,

    /// Base URL of core and plus tier lookups
    /// Default: `https://api.ipinfo.io/lookup/`
    pub lookup_base_url: String,

    /// Access token sent as `Authorization: Bearer <token>`
    /// Default: None (anonymous, subject to a lower quota)
    pub token: Option<String>,

    /// `User-Agent` header value
    /// Default: `IPinfoClient/Rust/<crate version>`
    pub user_agent: String,

    /// Deadline for single-key requests
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Client-side rate limit in requests per second
    /// Default: None (no limit)
    pub rate_limit: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lite_base_url: DEFAULT_LITE_BASE_URL.to_string(),
            lookup_base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            token: None,
            user_agent: USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            rate_limit: None,
        }
    }
}

impl ClientConfig {
    /// Create config from `IPINFO_TOKEN` and `IPINFO_BASE_URL`
    ///
    /// Unset or blank variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(token) = non_blank(TOKEN_ENV_VAR) {
            config.token = Some(token);
        }
        if let Some(base_url) = non_blank(BASE_URL_ENV_VAR) {
            debug!(base_url = %base_url, "Using base URL from environment");
            config.base_url = base_url;
        }
        config
    }

    /// Whether an access token is configured
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("lite_base_url", &self.lite_base_url)
            .field("lookup_base_url", &self.lookup_base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}
