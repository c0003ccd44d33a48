// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Batch lookups: fan-out over bounded chunks, fan-in into one result
//!
//! A batch call resolves many keys with as few requests as possible:
//!
//! 1. Duplicate keys are collapsed, keeping first-seen order.
//! 2. Keys already in the cache are copied straight into the result.
//! 3. The remaining keys are split into chunks of at most
//!    [`BatchOptions::batch_size`] keys (1000 at most), and every chunk is
//!    posted to the `batch` endpoint concurrently.
//! 4. Each chunk's response is decoded by key shape and merged into the
//!    result. A chunk that fails (transport, status, decode, or its own
//!    deadline) contributes nothing and is recorded as a failure.
//! 5. Once the network work is over, the new values are written to the cache.
//!
//! Partial success is the norm: inspect [`Batch::error`] to see whether any
//! chunk failed.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn, Instrument, Span};

use crate::cache::SingleFlightCache;
use crate::config::constants::{BATCH_MAX_SIZE, DEFAULT_CHUNK_TIMEOUT};
use crate::decode::{decode_batch, LookupValue};
use crate::errors::{ApiError, CacheError, IpinfoError, TimeoutScope};
use crate::spans;
use crate::transport::{ApiRequest, HttpExecutor};

/// Deadline for each chunk request of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkTimeout {
    /// Five seconds
    #[default]
    Default,
    /// No per-chunk deadline
    Disabled,
    /// A custom deadline
    After(Duration),
}

impl ChunkTimeout {
    /// Maps a signed number of seconds: `0` is the default, negative disables
    ///
    /// ```
    /// use ipinfo_client::ChunkTimeout;
    /// use std::time::Duration;
    ///
    /// assert_eq!(ChunkTimeout::from_secs(0), ChunkTimeout::Default);
    /// assert_eq!(ChunkTimeout::from_secs(-1), ChunkTimeout::Disabled);
    /// assert_eq!(ChunkTimeout::from_secs(2), ChunkTimeout::After(Duration::from_secs(2)));
    /// ```
    pub fn from_secs(secs: i64) -> Self {
        match secs {
            0 => ChunkTimeout::Default,
            s if s < 0 => ChunkTimeout::Disabled,
            s => ChunkTimeout::After(Duration::from_secs(s.unsigned_abs())),
        }
    }

    /// The effective deadline, if any
    pub fn duration(&self) -> Option<Duration> {
        match self {
            ChunkTimeout::Default => Some(DEFAULT_CHUNK_TIMEOUT),
            ChunkTimeout::Disabled => None,
            ChunkTimeout::After(after) => Some(*after),
        }
    }
}

/// Options for a batch call
///
/// # Example
///
/// ```rust
/// use ipinfo_client::{BatchOptions, ChunkTimeout};
/// use std::time::Duration;
///
/// let opts = BatchOptions::new()
///     .batch_size(100)
///     .chunk_timeout(ChunkTimeout::After(Duration::from_secs(2)))
///     .total_timeout(Duration::from_secs(10))
///     .filter(true);
/// assert_eq!(opts.effective_batch_size(), 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Keys per chunk; `0` or anything above 1000 means 1000
    pub batch_size: u32,
    /// Deadline of each chunk request
    pub timeout_per_batch: ChunkTimeout,
    /// Deadline of the whole call; `None` is unbounded
    pub timeout_total: Option<Duration>,
    /// Ask the service to omit empty values (`batch?filter=1`)
    pub filter: bool,
}

impl BatchOptions {
    /// Default options: 1000 keys per chunk, 5 second chunk deadline, no
    /// total deadline, no filtering
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of keys per chunk request
    ///
    /// `0` and values above 1000 are clamped to 1000.
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the deadline applied to each chunk request on its own
    pub fn chunk_timeout(mut self, timeout: ChunkTimeout) -> Self {
        self.timeout_per_batch = timeout;
        self
    }

    /// Bounds the whole call; chunks still running when it elapses are cancelled
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_total = Some(timeout);
        self
    }

    /// Sets the total deadline in seconds; `0` or negative means unbounded
    pub fn with_total_timeout_secs(mut self, secs: i64) -> Self {
        self.timeout_total = (secs > 0).then(|| Duration::from_secs(secs.unsigned_abs()));
        self
    }

    /// Asks the service to leave out keys with empty values
    pub fn filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    /// Chunk size actually used
    pub fn effective_batch_size(&self) -> usize {
        effective_batch_size(self.batch_size)
    }
}

/// Clamps a requested chunk size to `1..=1000`, treating `0` as 1000
pub fn effective_batch_size(requested: u32) -> usize {
    if requested == 0 || requested > BATCH_MAX_SIZE {
        BATCH_MAX_SIZE as usize
    } else {
        requested as usize
    }
}

/// Splits `items` into ordered chunks of at most the effective batch size
///
/// ```
/// use ipinfo_client::batch::partition;
///
/// let keys: Vec<u32> = (0..2500).collect();
/// let sizes: Vec<usize> = partition(&keys, 0).map(|chunk| chunk.len()).collect();
/// assert_eq!(sizes, vec![1000, 1000, 500]);
/// ```
pub fn partition<T>(items: &[T], batch_size: u32) -> std::slice::Chunks<'_, T> {
    items.chunks(effective_batch_size(batch_size))
}

/// Collapses duplicate keys, keeping first-seen order
pub(crate) fn dedup_keys<S: AsRef<str>>(keys: &[S]) -> Result<Vec<String>, IpinfoError> {
    let mut seen = HashSet::with_capacity(keys.len());
    let mut unique = Vec::with_capacity(keys.len());

    for key in keys {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(IpinfoError::invalid_input("batch keys must not be empty"));
        }
        if seen.insert(key) {
            unique.push(key.to_string());
        }
    }
    Ok(unique)
}

/// Result of a batch call
///
/// Holds every value that was found in the cache or decoded from a
/// successful chunk, plus the failures that occurred along the way. Keys of
/// failed chunks are absent.
#[derive(Debug, Clone)]
pub struct Batch<V, K = String> {
    values: HashMap<K, V>,
    failures: Vec<IpinfoError>,
}

impl<V, K> Default for Batch<V, K> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            failures: Vec::new(),
        }
    }
}

impl<V, K> Batch<V, K>
where
    K: Eq + Hash,
{
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.values.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.values.iter()
    }

    /// The first failure of the call, if any
    pub fn error(&self) -> Option<&IpinfoError> {
        self.failures.first()
    }

    /// All failures in the order they occurred
    pub fn failures(&self) -> &[IpinfoError] {
        &self.failures
    }

    /// Whether every requested key was resolved without failures
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_map(self) -> HashMap<K, V> {
        self.values
    }

    /// Converts every entry, recording entries that fail to convert as failures
    pub(crate) fn convert<K2, V2, F>(self, mut f: F) -> Batch<V2, K2>
    where
        K2: Eq + Hash,
        F: FnMut(K, V) -> Result<(K2, V2), IpinfoError>,
    {
        let mut converted = Batch {
            values: HashMap::with_capacity(self.values.len()),
            failures: self.failures,
        };
        for (key, value) in self.values {
            match f(key, value) {
                Ok((key, value)) => {
                    converted.values.insert(key, value);
                }
                Err(error) => converted.failures.push(error),
            }
        }
        converted
    }
}

impl<V, K> IntoIterator for Batch<V, K> {
    type Item = (K, V);
    type IntoIter = std::collections::hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Runs one batch call against an executor and an optional cache
pub(crate) struct Coordinator<'a> {
    pub(crate) executor: &'a dyn HttpExecutor,
    pub(crate) cache: Option<&'a SingleFlightCache<LookupValue, IpinfoError>>,
}

impl Coordinator<'_> {
    pub(crate) async fn run<S: AsRef<str>>(
        &self,
        keys: &[S],
        opts: &BatchOptions,
    ) -> Result<Batch<LookupValue>, IpinfoError> {
        let keys = dedup_keys(keys)?;
        if keys.is_empty() {
            return Ok(Batch::default());
        }

        let span = spans::batch(keys.len(), opts.batch_size);
        self.run_deduplicated(keys, opts).instrument(span).await
    }

    async fn run_deduplicated(
        &self,
        keys: Vec<String>,
        opts: &BatchOptions,
    ) -> Result<Batch<LookupValue>, IpinfoError> {
        let mut batch = Batch::default();

        let pending = match self.cache {
            Some(cache) => {
                let mut pending = Vec::with_capacity(keys.len());
                for key in keys {
                    match cache.get(&key).await {
                        Ok(value) => {
                            batch.values.insert(key, value);
                        }
                        Err(CacheError::NotFound { .. }) => pending.push(key),
                        Err(error) => {
                            warn!(key = %key, error = %error, "Cache lookup failed, aborting batch");
                            return Err(error.into());
                        }
                    }
                }
                pending
            }
            None => keys,
        };

        let chunks: Vec<&[String]> = partition(&pending, opts.batch_size).collect();
        Span::current().record("cached", batch.values.len());
        Span::current().record("chunks", chunks.len());

        if chunks.is_empty() {
            debug!(cached = batch.values.len(), "All keys served from cache");
            return Ok(batch);
        }

        let merged = Mutex::new(HashMap::with_capacity(pending.len()));
        let failures = Mutex::new(Vec::new());

        let fan_out = join_all(
            chunks
                .iter()
                .enumerate()
                .map(|(index, chunk)| self.run_chunk(index, chunk, opts, &merged, &failures)),
        );

        match opts.timeout_total {
            Some(total) => {
                if tokio::time::timeout(total, fan_out).await.is_err() {
                    warn!(after = ?total, "Batch deadline elapsed, cancelling outstanding chunks");
                    failures
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(IpinfoError::Timeout {
                            scope: TimeoutScope::Total,
                            after: total,
                        });
                }
            }
            None => {
                fan_out.await;
            }
        }

        let fetched = merged.into_inner().unwrap_or_else(PoisonError::into_inner);
        batch.failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);

        if let Some(cache) = self.cache {
            self.populate(cache, &pending, &fetched, &mut batch.failures)
                .await;
        }

        debug!(
            fetched = fetched.len(),
            failures = batch.failures.len(),
            "Batch fan-in complete"
        );
        batch.values.extend(fetched);

        if batch.values.is_empty() {
            if let Some(first) = batch.failures.first() {
                return Err(first.clone());
            }
        }
        Ok(batch)
    }

    async fn run_chunk(
        &self,
        index: usize,
        chunk: &[String],
        opts: &BatchOptions,
        merged: &Mutex<HashMap<String, LookupValue>>,
        failures: &Mutex<Vec<IpinfoError>>,
    ) {
        let span = spans::batch_chunk(index, chunk.len());
        async {
            match self.fetch_chunk(chunk, opts).await {
                Ok(decoded) => {
                    debug!(records = decoded.len(), "Merging chunk");
                    merged
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend(decoded);
                }
                Err(error) => {
                    warn!(error = %error, "Chunk failed, discarding its keys");
                    failures
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(error);
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch_chunk(
        &self,
        chunk: &[String],
        opts: &BatchOptions,
    ) -> Result<HashMap<String, LookupValue>, IpinfoError> {
        let body = serde_json::to_value(chunk).map_err(|e| ApiError::encode("POST batch", e))?;
        let deadline = opts.timeout_per_batch.duration();

        let mut request = ApiRequest::post("batch", body).with_timeout(deadline);
        if opts.filter {
            request = request.with_query("filter", "1");
        }

        let response = match deadline {
            Some(after) => tokio::time::timeout(after, self.executor.execute(request))
                .await
                .map_err(|_| IpinfoError::Timeout {
                    scope: TimeoutScope::Chunk,
                    after,
                })??,
            None => self.executor.execute(request).await?,
        };

        Ok(decode_batch(&response)?)
    }

    /// Writes newly fetched values for the requested keys to the cache
    async fn populate(
        &self,
        cache: &SingleFlightCache<LookupValue, IpinfoError>,
        requested: &[String],
        fetched: &HashMap<String, LookupValue>,
        failures: &mut Vec<IpinfoError>,
    ) {
        let mut store_failed = false;
        for key in requested {
            let Some(value) = fetched.get(key) else {
                continue;
            };
            if let Err(error) = cache.set(key, value.clone()).await {
                warn!(key = %key, error = %error, "Failed to cache batch result");
                if !store_failed {
                    store_failed = true;
                    failures.push(error.into());
                }
            }
        }
    }
}
