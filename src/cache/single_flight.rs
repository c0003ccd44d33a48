// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Single-flight de-duplication on top of a cache backend.
//!
//! Concurrent lookups for one key serialize through a per-key token:
//!
//! - The first caller creates the token, checks the backend and, on a miss,
//!   runs the fetch. The outcome is stored in the backend (on success) and in
//!   the token.
//! - Callers that arrive while the token is held wait for it, then return the
//!   outcome recorded in the token: the same value, or the same error.
//! - The token is removed from the registry as soon as its outcome is
//!   recorded. Callers already queued on it still read that outcome; callers
//!   arriving later create a fresh token. If the first caller's future is
//!   dropped before recording anything, the token goes away with its last
//!   holder or waiter.
//!
//! Failed fetches are never cached, so a caller arriving after the token has
//! been discarded will try again.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CacheBackend;
use crate::errors::CacheError;

/// How a [`Resolved`] value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Served from the cache backend
    Cache,
    /// Computed by this caller
    Computed,
    /// Produced by a concurrent caller this caller waited on
    Joined,
    /// Answered without the cache or the service, e.g. a bogon address
    Local,
}

/// A value returned by [`SingleFlightCache::get_or_compute`]
#[derive(Debug, Clone)]
pub struct Resolved<V> {
    /// The looked-up value
    pub value: V,
    /// Where the value came from
    pub origin: Origin,
    /// Set when the value was computed but could not be stored in the backend
    ///
    /// Caching is best-effort: the value is still valid. Callers may log or
    /// ignore this.
    pub store_error: Option<CacheError>,
}

impl<V> Resolved<V> {
    /// A freshly computed value with nothing to report
    pub fn computed(value: V) -> Self {
        Self {
            value,
            origin: Origin::Computed,
            store_error: None,
        }
    }

    pub fn local(value: V) -> Self {
        Self {
            value,
            origin: Origin::Local,
            store_error: None,
        }
    }

    /// Returns the value, discarding metadata
    pub fn into_value(self) -> V {
        self.value
    }

    /// Converts the value, keeping origin and store error
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            origin: self.origin,
            store_error: self.store_error,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(V) -> Result<U, E>) -> Result<Resolved<U>, E> {
        Ok(Resolved {
            value: f(self.value)?,
            origin: self.origin,
            store_error: self.store_error,
        })
    }
}

type Slot<V, E> = Option<Result<V, E>>;

struct InFlightEntry<V, E> {
    token: Arc<Mutex<Slot<V, E>>>,
    holders: usize,
}

type Registry<V, E> = StdMutex<HashMap<String, InFlightEntry<V, E>>>;

/// Registration of one caller on a key's in-flight token.
///
/// Dropping it deregisters the caller and discards the token once no caller
/// holds or awaits it.
struct InFlight<'a, V, E> {
    registry: &'a Registry<V, E>,
    key: &'a str,
    token: Arc<Mutex<Slot<V, E>>>,
}

impl<'a, V, E> InFlight<'a, V, E> {
    fn register(registry: &'a Registry<V, E>, key: &'a str) -> Self {
        let mut entries = registry.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| InFlightEntry {
                token: Arc::new(Mutex::new(None)),
                holders: 0,
            });
        entry.holders += 1;

        Self {
            registry,
            key,
            token: Arc::clone(&entry.token),
        }
    }
}

impl<V, E> InFlight<'_, V, E> {
    /// Removes this token from the registry so that later callers start afresh.
    ///
    /// Callers already queued on the token keep their handle and still read
    /// the recorded outcome.
    fn retire(&self) {
        let mut entries = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if entries
            .get(self.key)
            .is_some_and(|entry| Arc::ptr_eq(&entry.token, &self.token))
        {
            entries.remove(self.key);
        }
    }
}

impl<V, E> Drop for InFlight<'_, V, E> {
    fn drop(&mut self) {
        let mut entries = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // a retired token may have been replaced by a newer one under the same key
        if let Some(entry) = entries.get_mut(self.key) {
            if Arc::ptr_eq(&entry.token, &self.token) {
                entry.holders = entry.holders.saturating_sub(1);
                if entry.holders == 0 {
                    entries.remove(self.key);
                }
            }
        }
    }
}

/// Cache wrapper that performs at most one fetch per key at a time
///
/// `V` is the cached value type and `E` the error type of the fetch. Cache
/// errors convert into `E`, and `E` must be `Clone` so that every caller that
/// waited on a failed fetch receives the same error.
///
/// # Examples
///
/// ```rust
/// use ipinfo_client::cache::{MemoryCache, Origin, SingleFlightCache};
/// use ipinfo_client::IpinfoError;
///
/// # tokio_test_main(async {
/// let cache: SingleFlightCache<String, IpinfoError> =
///     SingleFlightCache::new(MemoryCache::new());
///
/// let first = cache
///     .get_or_compute("8.8.8.8", || async { Ok("dns.google".to_string()) })
///     .await?;
/// assert_eq!(first.origin, Origin::Computed);
///
/// let second = cache
///     .get_or_compute("8.8.8.8", || async { Ok("unused".to_string()) })
///     .await?;
/// assert_eq!(second.origin, Origin::Cache);
/// assert_eq!(second.value, "dns.google");
/// # Ok::<(), IpinfoError>(())
/// # });
/// # fn tokio_test_main<F: std::future::Future<Output = Result<(), IpinfoError>>>(f: F) {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f).unwrap();
/// # }
/// ```
pub struct SingleFlightCache<V, E> {
    backend: Arc<dyn CacheBackend<V>>,
    in_flight: Arc<Registry<V, E>>,
}

impl<V, E> SingleFlightCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + From<CacheError>,
{
    /// Wraps `backend`
    pub fn new<B>(backend: B) -> Self
    where
        B: CacheBackend<V> + 'static,
    {
        Self::from_arc(Arc::new(backend))
    }

    /// Wraps an already shared backend
    pub fn from_arc(backend: Arc<dyn CacheBackend<V>>) -> Self {
        Self {
            backend,
            in_flight: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Returns the cached value for `key`, or runs `compute` to produce it
    ///
    /// While this caller holds the key's token:
    /// - a value recorded by a concurrent caller is returned as [`Origin::Joined`]
    ///   (and a recorded error is returned as-is);
    /// - a backend hit is returned as [`Origin::Cache`];
    /// - a backend miss runs `compute` once and stores a successful result;
    /// - any other backend error is returned without running `compute`.
    ///
    /// # Errors
    ///
    /// Returns the error of `compute`, a backend operational error, or
    /// [`CacheError::InvalidKey`] for an empty key.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<Resolved<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if key.is_empty() {
            return Err(CacheError::invalid_key("lookup key must not be empty").into());
        }

        let in_flight = InFlight::register(&self.in_flight, key);
        let mut slot = in_flight.token.lock().await;

        if let Some(outcome) = slot.as_ref() {
            debug!(key = %key, "Joined in-flight lookup");
            return outcome.clone().map(|value| Resolved {
                value,
                origin: Origin::Joined,
                store_error: None,
            });
        }

        let outcome = self.resolve(key, compute).await;
        *slot = Some(match &outcome {
            Ok(resolved) => Ok(resolved.value.clone()),
            Err(error) => Err(error.clone()),
        });
        in_flight.retire();

        outcome
    }

    async fn resolve<F, Fut>(&self, key: &str, compute: F) -> Result<Resolved<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        match self.backend.get(key).await {
            Ok(value) => {
                debug!(key = %key, backend = self.backend.name(), "Lookup served from cache");
                return Ok(Resolved {
                    value,
                    origin: Origin::Cache,
                    store_error: None,
                });
            }
            Err(CacheError::NotFound { .. }) => {}
            Err(error) => {
                warn!(key = %key, backend = self.backend.name(), error = %error, "Cache backend failed");
                return Err(error.into());
            }
        }

        let value = compute().await?;

        let store_error = match self.backend.set(key, value.clone()).await {
            Ok(()) => None,
            Err(error) => {
                warn!(key = %key, backend = self.backend.name(), error = %error, "Failed to store lookup result");
                Some(error)
            }
        };

        Ok(Resolved {
            value,
            origin: Origin::Computed,
            store_error,
        })
    }

    /// Reads `key` from the backend directly, bypassing the in-flight tokens
    pub async fn get(&self, key: &str) -> Result<V, CacheError> {
        self.backend.get(key).await
    }

    /// Writes `key` to the backend directly, bypassing the in-flight tokens
    pub async fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        self.backend.set(key, value).await
    }

    /// The wrapped backend
    pub fn backend(&self) -> &Arc<dyn CacheBackend<V>> {
        &self.backend
    }

    /// Number of keys that currently have an in-flight token
    pub fn in_flight_keys(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<V, E> Clone for SingleFlightCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<V: Send + 'static, E> fmt::Debug for SingleFlightCache<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightCache")
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}
