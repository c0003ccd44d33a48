// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The lookup client
//!
//! [`Client`] is the entry point for every lookup. Single-key operations go
//! through the single-flight cache when one is configured, so concurrent
//! lookups of one key cost a single request; batch operations are handled
//! by the coordinator in [`crate::batch`].
//!
//! Every `get_*` single-key lookup has a `resolve_*` twin returning a
//! [`Resolved`], which also says where the value came from and whether
//! storing it in the cache failed.

use std::future::Future;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tower::Layer;
use tracing::{debug, Instrument};

use crate::batch::{Batch, BatchOptions, Coordinator};
use crate::bogon::is_bogon;
use crate::cache::{CacheBackend, Resolved, SingleFlightCache};
use crate::config::constants::{SUMMARY_MAX_IPS, SUMMARY_MIN_IPS};
use crate::config::ClientConfig;
use crate::decode::{decode_json, decode_text, normalize_asn, LookupValue};
use crate::errors::{ApiError, IpinfoError};
use crate::models::{
    AsnDetails, CoreDetails, Field, IpDetails, IpSummary, LiteDetails, PlusDetails,
    ResproxyDetails,
};
use crate::spans;
use crate::transport::{
    ApiRequest, Endpoint, HttpExecutor, LoggingLayer, RateLimitLayer, ReqwestExecutor,
};

/// Label of the caller's own address in decode errors
const OWN_ADDRESS: &str = "me";

/// Client for the lookup service
///
/// Cheap to clone: clones share the executor, the cache and its in-flight
/// bookkeeping.
///
/// # Example
///
/// ```rust,no_run
/// use ipinfo_client::cache::MemoryCache;
/// use ipinfo_client::{Client, IpinfoError};
///
/// # async fn example() -> Result<(), IpinfoError> {
/// let client = Client::builder()
///     .token("my-token")
///     .cache(MemoryCache::new())
///     .build()?;
///
/// let details = client.get_ip_info(Some("8.8.8.8".parse().unwrap())).await?;
/// println!("{} is in {}", details.ip, details.country_name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    executor: Arc<dyn HttpExecutor>,
    cache: Option<SingleFlightCache<LookupValue, IpinfoError>>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Builds an uncached client from `IPINFO_TOKEN` and `IPINFO_BASE_URL`
    pub fn from_env() -> Result<Self, IpinfoError> {
        ClientBuilder::from_config(ClientConfig::from_env()).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The single-flight cache, if caching is enabled
    pub fn cache(&self) -> Option<&SingleFlightCache<LookupValue, IpinfoError>> {
        self.cache.as_ref()
    }

    /// Looks up details for `ip`, or for the caller's own address when `None`
    ///
    /// Bogon addresses are answered locally with `bogon: true`. The caller's
    /// own address is never cached. Cache write failures are only logged;
    /// use [`resolve_ip_info`](Self::resolve_ip_info) to observe them.
    pub async fn get_ip_info(&self, ip: Option<IpAddr>) -> Result<IpDetails, IpinfoError> {
        Ok(self.resolve_ip_info(ip).await?.into_value())
    }

    pub async fn resolve_ip_info(
        &self,
        ip: Option<IpAddr>,
    ) -> Result<Resolved<IpDetails>, IpinfoError> {
        let Some(ip) = ip else {
            let body = self.fetch(ApiRequest::get("json")).await?;
            let mut details: IpDetails = decode_json("json", "IpDetails", &body)?;
            details.enrich();
            return Ok(Resolved::computed(details));
        };

        if is_bogon(ip) {
            debug!(ip = %ip, "Bogon address, skipping lookup");
            return Ok(Resolved::local(IpDetails::bogon(ip)));
        }

        let key = ip.to_string();
        let key = key.as_str();
        let resolved = self
            .cached(key, move || async move {
                let body = self.fetch(ApiRequest::get(format!("{key}/json"))).await?;
                let mut details: IpDetails = decode_json(key, "IpDetails", &body)?;
                details.enrich();
                Ok(LookupValue::Details(details))
            })
            .instrument(spans::lookup("get_ip_info", key))
            .await?;

        Ok(resolved.try_map(|value| value.into_details(key))?)
    }

    /// Looks up the lite tier record (country and ASN) for `ip`, or for the
    /// caller's own address when `None`
    ///
    /// Cached under `lite:<ip>`. Bogon addresses are answered locally.
    pub async fn get_ip_info_lite(&self, ip: Option<IpAddr>) -> Result<LiteDetails, IpinfoError> {
        Ok(self.resolve_ip_info_lite(ip).await?.into_value())
    }

    pub async fn resolve_ip_info_lite(
        &self,
        ip: Option<IpAddr>,
    ) -> Result<Resolved<LiteDetails>, IpinfoError> {
        let Some(ip) = ip else {
            let mut details: LiteDetails = self
                .fetch_record(Endpoint::Lite, "me", OWN_ADDRESS, "LiteDetails")
                .await?;
            details.enrich();
            return Ok(Resolved::computed(details));
        };

        if is_bogon(ip) {
            debug!(ip = %ip, "Bogon address, skipping lite lookup");
            return Ok(Resolved::local(LiteDetails::bogon(ip)));
        }

        let key = format!("lite:{ip}");
        let key = key.as_str();
        let resolved = self
            .cached(key, move || async move {
                let path = ip.to_string();
                let mut details: LiteDetails = self
                    .fetch_record(Endpoint::Lite, &path, key, "LiteDetails")
                    .await?;
                details.enrich();
                Ok(LookupValue::Lite(details))
            })
            .instrument(spans::lookup("get_ip_info_lite", key))
            .await?;

        Ok(resolved.try_map(|value| value.into_lite(key))?)
    }

    /// Looks up the core tier record for `ip`, or for the caller's own
    /// address when `None`
    ///
    /// Cached under `core:<ip>`. Bogon addresses are answered locally.
    pub async fn get_ip_info_core(&self, ip: Option<IpAddr>) -> Result<CoreDetails, IpinfoError> {
        Ok(self.resolve_ip_info_core(ip).await?.into_value())
    }

    pub async fn resolve_ip_info_core(
        &self,
        ip: Option<IpAddr>,
    ) -> Result<Resolved<CoreDetails>, IpinfoError> {
        let Some(ip) = ip else {
            let mut details: CoreDetails = self
                .fetch_record(Endpoint::Lookup, "", OWN_ADDRESS, "CoreDetails")
                .await?;
            details.enrich();
            return Ok(Resolved::computed(details));
        };

        if is_bogon(ip) {
            debug!(ip = %ip, "Bogon address, skipping core lookup");
            return Ok(Resolved::local(CoreDetails::bogon(ip)));
        }

        let key = format!("core:{ip}");
        let key = key.as_str();
        let resolved = self
            .cached(key, move || async move {
                let path = ip.to_string();
                let mut details: CoreDetails = self
                    .fetch_record(Endpoint::Lookup, &path, key, "CoreDetails")
                    .await?;
                details.enrich();
                Ok(LookupValue::Core(details))
            })
            .instrument(spans::lookup("get_ip_info_core", key))
            .await?;

        Ok(resolved.try_map(|value| value.into_core(key))?)
    }

    /// Looks up the plus tier record for `ip`, or for the caller's own
    /// address when `None`
    ///
    /// Cached under `plus:<ip>`. Bogon addresses are answered locally.
    pub async fn get_ip_info_plus(&self, ip: Option<IpAddr>) -> Result<PlusDetails, IpinfoError> {
        Ok(self.resolve_ip_info_plus(ip).await?.into_value())
    }

    pub async fn resolve_ip_info_plus(
        &self,
        ip: Option<IpAddr>,
    ) -> Result<Resolved<PlusDetails>, IpinfoError> {
        let Some(ip) = ip else {
            let mut details: PlusDetails = self
                .fetch_record(Endpoint::Lookup, "", OWN_ADDRESS, "PlusDetails")
                .await?;
            details.enrich();
            return Ok(Resolved::computed(details));
        };

        if is_bogon(ip) {
            debug!(ip = %ip, "Bogon address, skipping plus lookup");
            return Ok(Resolved::local(PlusDetails::bogon(ip)));
        }

        let key = format!("plus:{ip}");
        let key = key.as_str();
        let resolved = self
            .cached(key, move || async move {
                let path = ip.to_string();
                let mut details: PlusDetails = self
                    .fetch_record(Endpoint::Lookup, &path, key, "PlusDetails")
                    .await?;
                details.enrich();
                Ok(LookupValue::Plus(details))
            })
            .instrument(spans::lookup("get_ip_info_plus", key))
            .await?;

        Ok(resolved.try_map(|value| value.into_plus(key))?)
    }

    /// Looks up an autonomous system by identifier (`AS15169`, any case)
    ///
    /// # Errors
    ///
    /// Returns [`IpinfoError::InvalidAsn`] without any I/O when `asn` is not
    /// `AS` followed by digits.
    pub async fn get_asn_details(&self, asn: &str) -> Result<AsnDetails, IpinfoError> {
        Ok(self.resolve_asn_details(asn).await?.into_value())
    }

    pub async fn resolve_asn_details(
        &self,
        asn: &str,
    ) -> Result<Resolved<AsnDetails>, IpinfoError> {
        let key = normalize_asn(asn).ok_or_else(|| IpinfoError::invalid_asn(asn))?;
        let key = key.as_str();

        let resolved = self
            .cached(key, move || async move {
                let body = self.fetch(ApiRequest::get(format!("{key}/json"))).await?;
                let mut details: AsnDetails = decode_json(key, "AsnDetails", &body)?;
                details.enrich();
                Ok(LookupValue::Asn(details))
            })
            .instrument(spans::lookup("get_asn_details", key))
            .await?;

        Ok(resolved.try_map(|value| value.into_asn(key))?)
    }

    /// Fetches a single attribute of `ip` (or of the caller's own address) as text
    pub async fn get_ip_field(&self, ip: Option<IpAddr>, field: Field) -> Result<String, IpinfoError> {
        Ok(self.resolve_ip_field(ip, field).await?.into_value())
    }

    pub async fn resolve_ip_field(
        &self,
        ip: Option<IpAddr>,
        field: Field,
    ) -> Result<Resolved<String>, IpinfoError> {
        let Some(ip) = ip else {
            let body = self.fetch(ApiRequest::get(field.as_str())).await?;
            return Ok(Resolved::computed(decode_text(field.as_str(), &body)?));
        };

        let key = format!("{ip}:{field}");
        let key = key.as_str();
        let resolved = self
            .cached(key, move || async move {
                let body = self.fetch(ApiRequest::get(format!("{ip}/{field}"))).await?;
                Ok(LookupValue::Text(decode_text(key, &body)?))
            })
            .instrument(spans::lookup("get_ip_field", key))
            .await?;

        Ok(resolved.try_map(|value| value.into_text(key))?)
    }

    /// Looks up residential proxy observations for `ip`
    pub async fn get_resproxy(&self, ip: IpAddr) -> Result<ResproxyDetails, IpinfoError> {
        Ok(self.resolve_resproxy(ip).await?.into_value())
    }

    pub async fn resolve_resproxy(
        &self,
        ip: IpAddr,
    ) -> Result<Resolved<ResproxyDetails>, IpinfoError> {
        let key = format!("resproxy:{ip}");
        let key = key.as_str();
        let resolved = self
            .cached(key, move || async move {
                let body = self.fetch(ApiRequest::get(format!("resproxy/{ip}"))).await?;
                let details: ResproxyDetails = decode_json(key, "ResproxyDetails", &body)?;
                Ok(LookupValue::Resproxy(details))
            })
            .instrument(spans::lookup("get_resproxy", key))
            .await?;

        Ok(resolved.try_map(|value| value.into_resproxy(key))?)
    }

    /// Summarizes between 10 and 1000 addresses; never cached
    pub async fn get_ip_summary(&self, ips: &[IpAddr]) -> Result<IpSummary, IpinfoError> {
        if !(SUMMARY_MIN_IPS..=SUMMARY_MAX_IPS).contains(&ips.len()) {
            return Err(IpinfoError::invalid_input(format!(
                "summary needs between {SUMMARY_MIN_IPS} and {SUMMARY_MAX_IPS} addresses, got {}",
                ips.len()
            )));
        }

        let body = serde_json::to_value(ips).map_err(|e| ApiError::encode("POST summarize", e))?;
        let response = self.fetch(ApiRequest::post("summarize", body)).await?;
        Ok(decode_json("summarize", "IpSummary", &response)?)
    }

    /// Looks up many keys of any shape at once
    ///
    /// Values decode by key shape: IP addresses to [`LookupValue::Details`],
    /// ASNs to [`LookupValue::Asn`], anything else to
    /// [`LookupValue::Generic`]. See [`crate::batch`] for the full algorithm.
    ///
    /// # Errors
    ///
    /// Fails before any I/O on empty keys or a cache backend error, and fails
    /// with the first chunk error when nothing at all could be resolved.
    pub async fn get_batch<S: AsRef<str>>(
        &self,
        keys: &[S],
        opts: &BatchOptions,
    ) -> Result<Batch<LookupValue>, IpinfoError> {
        self.coordinator().run(keys, opts).await
    }

    /// Looks up details for many IP addresses at once
    pub async fn get_ip_info_batch(
        &self,
        ips: &[IpAddr],
        opts: &BatchOptions,
    ) -> Result<Batch<IpDetails, IpAddr>, IpinfoError> {
        let keys: Vec<String> = ips.iter().map(IpAddr::to_string).collect();
        let batch = self.coordinator().run(&keys, opts).await?;

        Ok(batch.convert(|key, value| {
            let ip = key
                .parse::<IpAddr>()
                .map_err(|_| IpinfoError::invalid_input(format!("unexpected key {key} in response")))?;
            Ok((ip, value.into_details(&key)?))
        }))
    }

    /// Looks up many autonomous systems at once
    ///
    /// # Errors
    ///
    /// Returns [`IpinfoError::InvalidAsn`] without any I/O if any input is not
    /// an ASN identifier.
    pub async fn get_asn_details_batch<S: AsRef<str>>(
        &self,
        asns: &[S],
        opts: &BatchOptions,
    ) -> Result<Batch<AsnDetails>, IpinfoError> {
        let keys = asns
            .iter()
            .map(|asn| normalize_asn(asn.as_ref()).ok_or_else(|| IpinfoError::invalid_asn(asn.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        let batch = self.coordinator().run(&keys, opts).await?;

        Ok(batch.convert(|key, value| {
            let details = value.into_asn(&key)?;
            Ok((key, details))
        }))
    }

    fn coordinator(&self) -> Coordinator<'_> {
        Coordinator {
            executor: self.executor.as_ref(),
            cache: self.cache.as_ref(),
        }
    }

    /// Runs `compute` through the single-flight cache, or directly without one
    async fn cached<F, Fut>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<Resolved<LookupValue>, IpinfoError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LookupValue, IpinfoError>>,
    {
        match &self.cache {
            Some(cache) => cache.get_or_compute(key, compute).await,
            None => compute().await.map(Resolved::computed),
        }
    }

    /// Fetches and decodes one JSON record from a tier endpoint
    async fn fetch_record<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        key: &str,
        expected: &'static str,
    ) -> Result<T, IpinfoError> {
        let body = self
            .fetch(ApiRequest::get(path).with_endpoint(endpoint))
            .await?;
        Ok(decode_json(key, expected, &body)?)
    }

    /// Executes a single-key request under the configured request deadline
    async fn fetch(&self, request: ApiRequest) -> Result<Vec<u8>, IpinfoError> {
        let after = self.config.request_timeout;
        let operation = request.operation();
        let request = request.with_timeout(Some(after));

        match tokio::time::timeout(after, self.executor.execute(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ApiError::timeout(operation, after).into()),
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`]
///
/// # Example
///
/// ```rust
/// use ipinfo_client::cache::MemoryCache;
/// use ipinfo_client::Client;
/// use std::time::Duration;
///
/// let client = Client::builder()
///     .token("my-token")
///     .request_timeout(Duration::from_secs(10))
///     .rate_limit(50)
///     .cache(MemoryCache::new().with_max_entries(10_000))
///     .build()
///     .unwrap();
/// assert!(client.cache().is_some());
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
    cache: Option<Arc<dyn CacheBackend<LookupValue>>>,
    executor: Option<Arc<dyn HttpExecutor>>,
    logging: LoggingLayer,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Starts from [`ClientConfig::default`], without a cache
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            cache: None,
            executor: None,
            logging: LoggingLayer::new(),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn lite_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.lite_base_url = base_url.into();
        self
    }

    /// Base URL of core and plus tier lookups
    pub fn lookup_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.lookup_base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Deadline for single-key requests (default 30 seconds)
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Limits outgoing requests per second; `0` means unlimited
    pub fn rate_limit(mut self, requests_per_second: u32) -> Self {
        self.config.rate_limit = (requests_per_second > 0).then_some(requests_per_second);
        self
    }

    /// Caches lookups in `backend`
    pub fn cache<B>(mut self, backend: B) -> Self
    where
        B: CacheBackend<LookupValue> + 'static,
    {
        self.cache = Some(Arc::new(backend));
        self
    }

    /// Caches lookups in a backend shared with other clients
    pub fn shared_cache(mut self, backend: Arc<dyn CacheBackend<LookupValue>>) -> Self {
        self.cache = Some(backend);
        self
    }

    /// Sends requests through `executor` instead of the default `reqwest` one
    pub fn executor<E>(mut self, executor: E) -> Self
    where
        E: HttpExecutor + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Logs request and response bodies at `trace` level
    pub fn verbose_logging(mut self) -> Self {
        self.logging = self.logging.verbose();
        self
    }

    /// # Errors
    ///
    /// Fails if the default executor cannot be built (e.g. invalid base URL).
    pub fn build(self) -> Result<Client, IpinfoError> {
        let executor: Arc<dyn HttpExecutor> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(ReqwestExecutor::new(&self.config)?),
        };

        let executor: Arc<dyn HttpExecutor> = match self.config.rate_limit {
            Some(requests) => Arc::new(RateLimitLayer::per_second(requests).layer(executor)),
            None => executor,
        };
        let executor: Arc<dyn HttpExecutor> = Arc::new(self.logging.layer(executor));

        debug!(config = ?self.config, cached = self.cache.is_some(), "Built lookup client");

        Ok(Client {
            config: self.config,
            executor,
            cache: self.cache.map(SingleFlightCache::from_arc),
        })
    }
}

static DEFAULT_CLIENT: OnceLock<Client> = OnceLock::new();

/// Installs the process-wide default client
///
/// # Errors
///
/// Hands `client` back if a default client is already installed.
pub fn init_default(client: Client) -> Result<(), Client> {
    DEFAULT_CLIENT.set(client)
}

/// The process-wide default client
///
/// Built from the environment (see [`Client::from_env`]) on first use unless
/// [`init_default`] installed one before.
pub fn default_client() -> Result<&'static Client, IpinfoError> {
    if let Some(client) = DEFAULT_CLIENT.get() {
        return Ok(client);
    }
    let client = Client::from_env()?;
    Ok(DEFAULT_CLIENT.get_or_init(|| client))
}
