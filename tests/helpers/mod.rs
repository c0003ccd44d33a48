// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for ipinfo-client integration tests
//!
//! Provides mock implementations of the executor and cache traits to enable
//! testing without a network connection.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ipinfo_client::cache::{CacheBackend, CacheStats, MemoryCache};
use ipinfo_client::transport::{ApiRequest, Endpoint, HttpExecutor, Method};
use ipinfo_client::{ApiError, CacheError, KeyShape, LookupValue};
use serde_json::{json, Value};

type Responder = dyn Fn(&ApiRequest) -> Result<Vec<u8>, ApiError> + Send + Sync;
type Delay = dyn Fn(&ApiRequest) -> Option<Duration> + Send + Sync;

/// Installs a test subscriber once; honors `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mock HttpExecutor for testing client and batch logic
///
/// Records every request it receives (before any artificial delay, so
/// requests cancelled by a deadline are still counted) and answers through a
/// responder closure. Clones share the request log.
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockExecutor::canned().with_delay(|req| {
///     batch_keys(req).contains(&"slow".to_string()).then(|| Duration::from_secs(10))
/// });
/// let client = Client::builder().executor(mock.clone()).build()?;
/// ```
#[derive(Clone)]
pub struct MockExecutor {
    responder: Arc<Responder>,
    delay: Arc<Delay>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockExecutor {
    /// Create a mock that answers every request with `responder`
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Vec<u8>, ApiError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: Arc::new(|_| None),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that answers like the real service would, see [`canned_response`]
    pub fn canned() -> Self {
        Self::new(canned_response)
    }

    /// Delay responses by the duration `delay` returns for each request
    pub fn with_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(&ApiRequest) -> Option<Duration> + Send + Sync + 'static,
    {
        self.delay = Arc::new(delay);
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Keys of every batch request received so far, one entry per request
    pub fn batch_requests(&self) -> Vec<Vec<String>> {
        self.requests()
            .iter()
            .filter(|req| req.method == Method::Post && req.path == "batch")
            .map(batch_keys)
            .collect()
    }
}

#[async_trait]
impl HttpExecutor for MockExecutor {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = (self.delay)(&request) {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }
}

/// Keys in the JSON array body of a batch request
pub fn batch_keys(request: &ApiRequest) -> Vec<String> {
    request
        .body
        .as_ref()
        .and_then(|body| serde_json::from_value(body.clone()).ok())
        .unwrap_or_default()
}

/// Record the mock service returns for `key`
pub fn canned_record(key: &str) -> Value {
    match KeyShape::classify(key) {
        KeyShape::Ip => json!({
            "ip": key,
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "org": "AS15169 Google LLC"
        }),
        KeyShape::Asn => json!({
            "asn": key,
            "name": format!("{key} Example Networks"),
            "country": "DE",
            "num_ips": 256,
            "type": "isp"
        }),
        KeyShape::Other => json!(format!("value of {key}")),
    }
}

/// Lite tier record for `ip`
pub fn canned_lite_record(ip: &str) -> Value {
    json!({
        "ip": ip,
        "asn": "AS15169",
        "as_name": "Google LLC",
        "as_domain": "google.com",
        "country_code": "DE",
        "country": "Germany",
        "continent_code": "EU",
        "continent": "Europe"
    })
}

/// Plus tier record for `ip`; core clients read the subset they know
pub fn canned_lookup_record(ip: &str) -> Value {
    json!({
        "ip": ip,
        "hostname": "dns.example",
        "geo": {
            "city": "Tokyo",
            "region": "Tokyo",
            "region_code": "13",
            "country": "Japan",
            "country_code": "JP",
            "continent": "Asia",
            "continent_code": "AS",
            "latitude": 35.6895,
            "longitude": 139.6917,
            "timezone": "Asia/Tokyo",
            "postal_code": "100-0001",
            "geoname_id": "1850147",
            "radius": 20
        },
        "as": {"asn": "AS2497", "name": "Internet Initiative Japan", "domain": "iij.ad.jp", "type": "isp"},
        "anonymous": {"is_proxy": false, "is_relay": false, "is_tor": false, "is_vpn": true, "name": "ExampleVPN"},
        "is_anonymous": true,
        "is_hosting": true,
        "abuse": {"country": "JP", "email": "abuse@example.jp"},
        "privacy": {"vpn": true, "service": "ExampleVPN"}
    })
}

/// Answers requests the way the lookup service would
///
/// - lite endpoint `GET <ip>` and `GET me`: a lite tier record
/// - lookup endpoint `GET <ip>` and `GET` of the base URL: a plus tier record
/// - `POST batch`: an object mapping every key in the body to its record
/// - `POST summarize`: a summary counting the addresses in the body
/// - `GET resproxy/<ip>`: a residential proxy record
/// - `GET <key>/json` and `GET json`: the record for the key
/// - `GET <ip>/<field>` and `GET <field>`: plain text with a trailing newline
pub fn canned_response(request: &ApiRequest) -> Result<Vec<u8>, ApiError> {
    match (request.endpoint, request.path.as_str()) {
        (Endpoint::Lite, "me") => return to_body(canned_lite_record("198.51.100.7")),
        (Endpoint::Lite, ip) => return to_body(canned_lite_record(ip)),
        (Endpoint::Lookup, "") => return to_body(canned_lookup_record("198.51.100.7")),
        (Endpoint::Lookup, ip) => return to_body(canned_lookup_record(ip)),
        (Endpoint::Standard, _) => {}
    }

    let body = match (request.method, request.path.as_str()) {
        (Method::Post, "batch") => {
            let records: serde_json::Map<String, Value> = batch_keys(request)
                .into_iter()
                .map(|key| {
                    let record = canned_record(&key);
                    (key, record)
                })
                .collect();
            Value::Object(records)
        }
        (Method::Post, "summarize") => {
            let total = batch_keys(request).len();
            json!({"total": total, "unique": total, "countries": {"US": total}})
        }
        (Method::Get, "json") => canned_record("198.51.100.7"),
        (Method::Get, path) if path.starts_with("resproxy/") => json!({
            "ip": path.trim_start_matches("resproxy/"),
            "last_seen": "2025-01-20",
            "percent_days_seen": 2.5,
            "service": "example-proxy"
        }),
        (Method::Get, path) => match path.rsplit_once('/') {
            Some((key, "json")) => canned_record(key),
            Some((_, field)) => return Ok(format!("{field} text\n").into_bytes()),
            None => return Ok(format!("{path} text\n").into_bytes()),
        },
        (Method::Post, path) => {
            return Err(ApiError::status(404, "Not found", format!("no such endpoint {path}")))
        }
    };
    to_body(body)
}

fn to_body(value: Value) -> Result<Vec<u8>, ApiError> {
    Ok(serde_json::to_vec(&value).unwrap())
}

/// Cache that counts traffic to an inner [`MemoryCache`]
#[derive(Clone, Default)]
pub struct CountingCache {
    inner: Arc<MemoryCache<LookupValue>>,
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
}

impl CountingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend<LookupValue> for CountingCache {
    async fn get(&self, key: &str) -> Result<LookupValue, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: LookupValue) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn stats(&self) -> CacheStats {
        self.inner.stats().await
    }

    fn name(&self) -> &'static str {
        "CountingCache"
    }
}

/// Cache whose reads fail operationally
pub struct UnavailableCache;

#[async_trait]
impl CacheBackend<LookupValue> for UnavailableCache {
    async fn get(&self, _key: &str) -> Result<LookupValue, CacheError> {
        Err(CacheError::backend("UnavailableCache", "connection refused"))
    }

    async fn set(&self, _key: &str, _value: LookupValue) -> Result<(), CacheError> {
        Err(CacheError::backend("UnavailableCache", "connection refused"))
    }

    fn name(&self) -> &'static str {
        "UnavailableCache"
    }
}

/// Cache that reads as empty and rejects every write
pub struct ReadOnlyCache;

#[async_trait]
impl CacheBackend<LookupValue> for ReadOnlyCache {
    async fn get(&self, key: &str) -> Result<LookupValue, CacheError> {
        Err(CacheError::not_found(key))
    }

    async fn set(&self, _key: &str, _value: LookupValue) -> Result<(), CacheError> {
        Err(CacheError::backend("ReadOnlyCache", "writes disabled"))
    }

    fn name(&self) -> &'static str {
        "ReadOnlyCache"
    }
}
