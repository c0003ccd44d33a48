// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory cache implementation with expiration and optional size limits

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::{
    types::{AccessSequence, Expiry},
    CacheBackend, CacheStats,
};
use crate::config::constants::DEFAULT_CACHE_TTL;
use crate::errors::CacheError;

/// Entry in the memory cache with metadata
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires: Expiry,
    /// Last access, for LRU eviction
    access_seq: AccessSequence,
}

/// Configuration for memory cache
#[derive(Debug, Clone)]
struct MemoryCacheConfig {
    /// Maximum number of entries before eviction starts
    max_entries: Option<usize>,
    /// Time-to-live for cache entries
    ttl: Option<Duration>,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            ttl: Some(DEFAULT_CACHE_TTL),
        }
    }
}

#[derive(Debug)]
struct MemoryCacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
    next_seq: AccessSequence,
}

impl<V> Default for MemoryCacheState<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
            next_seq: AccessSequence::default(),
        }
    }
}

impl<V> MemoryCacheState<V> {
    fn bump_seq(&mut self) -> AccessSequence {
        let seq = self.next_seq;
        self.next_seq = seq.next();
        seq
    }
}

/// In-memory cache with expiration and optional size limits
///
/// Entries expire 24 hours after they were stored unless configured
/// otherwise. Expired entries are dropped lazily when accessed.
///
/// # Examples
///
/// ```rust
/// use ipinfo_client::cache::MemoryCache;
/// use ipinfo_client::LookupValue;
/// use std::time::Duration;
///
/// // Default: 24 hour expiration, unbounded size
/// let cache: MemoryCache<LookupValue> = MemoryCache::new();
///
/// // Short-lived entries, at most 500 of them
/// let cache: MemoryCache<LookupValue> = MemoryCache::new()
///     .with_ttl(Duration::from_secs(300))
///     .with_max_entries(500);
/// ```
///
/// # Performance
///
/// - Get: O(1) average case (HashMap lookup)
/// - Set: O(1) without eviction, O(n) with eviction (finds LRU)
#[derive(Debug)]
pub struct MemoryCache<V> {
    config: MemoryCacheConfig,
    state: Mutex<MemoryCacheState<V>>,
}

impl<V> MemoryCache<V> {
    /// Creates a new memory cache with the default 24 hour expiration
    pub fn new() -> Self {
        Self {
            config: MemoryCacheConfig::default(),
            state: Mutex::new(MemoryCacheState::default()),
        }
    }

    /// Sets the maximum number of entries in the cache
    ///
    /// When the limit is reached, the least recently used entry is evicted.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Sets the time-to-live for cache entries
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    /// Disables expiration; entries live until evicted or cleared
    pub fn without_ttl(mut self) -> Self {
        self.config.ttl = None;
        self
    }

    fn evict_lru(state: &mut MemoryCacheState<V>) {
        let lru_key = state
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.access_seq)
            .map(|(key, _)| key.clone());

        if let Some(key) = lru_key {
            debug!(key = %key, "Evicting LRU cache entry");
            state.entries.remove(&key);
            state.stats.evictions += 1;
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> CacheBackend<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<V, CacheError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let seq = state.bump_seq();

        let expired = match state.entries.get_mut(key) {
            Some(entry) if !entry.expires.is_expired() => {
                entry.access_seq = seq;
                let value = entry.value.clone();
                state.stats.hits += 1;
                debug!(key = %key, "Cache hit (memory)");
                return Ok(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!(key = %key, "Cache entry expired");
            state.entries.remove(key);
            state.stats.expirations += 1;
            state.stats.entries = state.entries.len();
        }
        state.stats.misses += 1;
        debug!(key = %key, "Cache miss (memory)");

        Err(CacheError::not_found(key))
    }

    async fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if let Some(max_entries) = self.config.max_entries {
            if !state.entries.contains_key(key) {
                while !state.entries.is_empty() && state.entries.len() >= max_entries {
                    Self::evict_lru(state);
                }
            }
        }

        debug!(key = %key, "Inserting entry into memory cache");
        let access_seq = state.bump_seq();
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires: Expiry::after(self.config.ttl),
                access_seq,
            },
        );
        state.stats.entries = state.entries.len();

        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;
        debug!(entries = state.entries.len(), "Clearing memory cache");
        state.entries.clear();
        state.stats.entries = 0;
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryCache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_basic_operations() {
        let cache: MemoryCache<String> = MemoryCache::new();

        let miss = cache.get("8.8.8.8").await;
        assert!(matches!(miss, Err(CacheError::NotFound { .. })));

        cache.set("8.8.8.8", "dns.google".to_string()).await.unwrap();
        assert_eq!(cache.get("8.8.8.8").await.unwrap(), "dns.google");

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_memory_cache_overwrite_keeps_single_entry() {
        let cache: MemoryCache<u32> = MemoryCache::new().with_max_entries(1);
        cache.set("AS15169", 1u32).await.unwrap();
        cache.set("AS15169", 2u32).await.unwrap();

        assert_eq!(cache.get("AS15169").await.unwrap(), 2);
        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test]
    async fn test_memory_cache_size_limit_evicts_lru() {
        let cache: MemoryCache<String> = MemoryCache::new().with_max_entries(3);

        for ip in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
            cache.set(ip, ip.to_string()).await.unwrap();
        }

        // Touch the oldest entry so 2.2.2.2 becomes least recently used
        assert!(cache.get("1.1.1.1").await.is_ok());

        cache.set("4.4.4.4", "4.4.4.4".to_string()).await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.evictions, 1);

        assert!(cache.get("1.1.1.1").await.is_ok());
        assert!(cache.get("3.3.3.3").await.is_ok());
        assert!(cache.get("4.4.4.4").await.is_ok());
        assert!(cache.get("2.2.2.2").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_cache_ttl() {
        let cache: MemoryCache<u8> = MemoryCache::new().with_ttl(Duration::from_millis(50));

        cache.set("8.8.4.4", 7u8).await.unwrap();
        assert!(cache.get("8.8.4.4").await.is_ok());

        tokio::time::sleep(Duration::from_millis(100)).await;

        let expired = cache.get("8.8.4.4").await;
        assert!(matches!(expired, Err(CacheError::NotFound { .. })));

        let stats = cache.stats().await;
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.entries, 0);
    }

    #[tokio::test]
    async fn test_memory_cache_without_ttl_keeps_entries() {
        let cache: MemoryCache<()> = MemoryCache::new().without_ttl();
        cache.set("9.9.9.9", ()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get("9.9.9.9").await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache: MemoryCache<u8> = MemoryCache::new();
        for i in 0..5u8 {
            cache.set(&format!("10.0.0.{i}"), i).await.unwrap();
        }
        assert_eq!(cache.stats().await.entries, 5);

        cache.clear().await.unwrap();

        assert_eq!(cache.stats().await.entries, 0);
        for i in 0..5u8 {
            assert!(cache.get(&format!("10.0.0.{i}")).await.is_err());
        }
    }

    #[tokio::test]
    async fn test_memory_cache_hit_rate() {
        let cache: MemoryCache<u8> = MemoryCache::new();
        let _ = cache.get("1.0.0.1").await;
        cache.set("1.0.0.1", 1u8).await.unwrap();
        for _ in 0..3 {
            let _ = cache.get("1.0.0.1").await;
        }

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 75.0);
    }
}
