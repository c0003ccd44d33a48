// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Service endpoints, limits, and defaults
//!
//! This module centralizes the magic numbers of the lookup service so they are
//! discoverable in one place.

use std::time::Duration;

/// Base URL of the lookup service
pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io/";

/// Base URL of the lite tier
pub const DEFAULT_LITE_BASE_URL: &str = "https://api.ipinfo.io/lite/";

/// Base URL of the core and plus tiers
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://api.ipinfo.io/lookup/";

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("IPinfoClient/Rust/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the access token
pub const TOKEN_ENV_VAR: &str = "IPINFO_TOKEN";

/// Environment variable overriding [`DEFAULT_BASE_URL`]
pub const BASE_URL_ENV_VAR: &str = "IPINFO_BASE_URL";

/// Largest number of keys the batch endpoint accepts in one request
pub const BATCH_MAX_SIZE: u32 = 1000;

/// Deadline applied to each batch chunk unless configured otherwise
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline applied to single-key requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifetime of entries in [`crate::cache::MemoryCache`] unless configured otherwise
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Fewest addresses the summary endpoint accepts
pub const SUMMARY_MIN_IPS: usize = 10;

/// Most addresses the summary endpoint accepts
pub const SUMMARY_MAX_IPS: usize = 1000;
