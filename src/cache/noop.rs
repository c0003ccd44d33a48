//! No-operation cache that disables caching entirely

use async_trait::async_trait;

use super::CacheBackend;
use crate::errors::CacheError;

/// A no-operation cache that disables caching entirely
///
/// Reads always report [`CacheError::NotFound`] and writes are discarded, so
/// every lookup goes to the network. Concurrent lookups for the same key are
/// still de-duplicated by [`super::SingleFlightCache`] while they are in flight.
///
/// # Examples
///
/// ```rust,ignore
/// use ipinfo_client::cache::NoOpCache;
/// use ipinfo_client::Client;
///
/// let client = Client::builder().cache(NoOpCache).build()?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

#[async_trait]
impl<V: Send + 'static> CacheBackend<V> for NoOpCache {
    async fn get(&self, key: &str) -> Result<V, CacheError> {
        Err(CacheError::not_found(key))
    }

    async fn set(&self, _key: &str, _value: V) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NoOpCache"
    }
}
