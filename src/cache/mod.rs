// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cache backends and the single-flight cache wrapper
//!
//! Lookups are cached to avoid repeat round-trips and protect the API quota.
//! The storage itself is pluggable:
//!
//! - [`MemoryCache`]: In-memory cache with expiration (24 hours by default) and
//!   optional size limits
//! - [`NoOpCache`]: Never stores anything (every lookup goes to the network)
//! - Your own backend: implement [`CacheBackend`] for e.g. Redis or memcached
//!
//! [`SingleFlightCache`] wraps any backend and guarantees that concurrent
//! lookups for the same key perform at most one fetch.
//!
//! # Examples
//!
//! ```rust,ignore
//! use ipinfo_client::cache::MemoryCache;
//! use ipinfo_client::Client;
//! use std::time::Duration;
//!
//! let cache = MemoryCache::new()
//!     .with_ttl(Duration::from_secs(300))
//!     .with_max_entries(10_000);
//!
//! let client = Client::builder()
//!     .token(std::env::var("IPINFO_TOKEN")?)
//!     .cache(cache)
//!     .build()?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CacheError;

mod memory;
mod noop;
mod single_flight;
mod types;

pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use single_flight::{Origin, Resolved, SingleFlightCache};
pub use types::{AccessSequence, Expiry};

/// Statistics about cache performance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits (successful retrievals)
    pub hits: u64,
    /// Number of cache misses (key not found)
    pub misses: u64,
    /// Number of entries evicted due to size limits
    pub evictions: u64,
    /// Number of entries expired due to TTL
    pub expirations: u64,
    /// Current number of entries in the cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, evictions={}, expirations={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.expirations,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Trait for lookup cache backends
///
/// A backend is a key-value store over a single value type `V`. The client
/// uses `V = LookupValue`, the tagged union of all record shapes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. The single-flight wrapper serializes
/// access per key, but distinct keys may be read and written concurrently.
///
/// # Error Handling
///
/// `get` must report an absent or expired key as [`CacheError::NotFound`].
/// Any other error is treated as an operational failure of the backend and is
/// propagated to the caller instead of falling through to the network.
#[async_trait]
pub trait CacheBackend<V: Send + 'static>: Send + Sync {
    /// Retrieves the value stored under `key`
    async fn get(&self, key: &str) -> Result<V, CacheError>;

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// Backends with size limits may evict older entries to make room.
    async fn set(&self, key: &str, value: V) -> Result<(), CacheError>;

    /// Clears all entries from the cache
    ///
    /// Not all backends support this; the default implementation does nothing.
    async fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }

    /// Returns current cache statistics
    ///
    /// Backends that don't track statistics return all zeroes.
    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    /// Returns a human-readable name for this cache backend
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &'static str;
}
