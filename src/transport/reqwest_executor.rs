// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! [`HttpExecutor`] backed by `reqwest`.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use url::Url;

use super::{ApiRequest, Endpoint, HttpExecutor, Method};
use crate::config::ClientConfig;
use crate::errors::ApiError;

/// Executes requests with a shared `reqwest::Client`
///
/// Sends `Accept: application/json`, the configured `User-Agent`, and
/// `Authorization: Bearer <token>` when a token is configured. Non-2xx
/// responses become [`ApiError::Status`] carrying the service's error title
/// and message when the body has them.
#[derive(Clone)]
pub struct ReqwestExecutor {
    http: reqwest::Client,
    base_url: Url,
    lite_base_url: Url,
    lookup_base_url: Url,
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    message: String,
}

impl ReqwestExecutor {
    /// Builds an executor from the connection settings in `config`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if a base URL does not parse and
    /// [`ApiError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::transport("build HTTP client", e))?;

        Self::with_client(http, config)
    }

    /// Builds an executor around an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http,
            base_url: parse_base(&config.base_url)?,
            lite_base_url: parse_base(&config.lite_base_url)?,
            lookup_base_url: parse_base(&config.lookup_base_url)?,
            token: config.token.clone(),
        })
    }

    fn base_for(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Standard => &self.base_url,
            Endpoint::Lite => &self.lite_base_url,
            Endpoint::Lookup => &self.lookup_base_url,
        }
    }

    /// Resolves a request path against its endpoint's base URL
    ///
    /// Paths are appended verbatim: `Url::join` would read the leading
    /// segment of an IPv6 literal (`2001:db8::1/json`) as a URL scheme.
    fn resolve(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let raw = format!(
            "{}{}",
            self.base_for(request.endpoint).as_str(),
            request.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

/// Parses a base URL, adding the trailing slash paths are appended after
fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let mut base = raw.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Extracts the service's error title and message from a non-2xx body
fn parse_error_body(status: reqwest::StatusCode, body: &[u8]) -> ApiError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_default();

    let title = if detail.title.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        detail.title
    };
    ApiError::status(status.as_u16(), title, detail.message)
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let operation = request.operation();
        let url = self.resolve(&request)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::timeout(&operation, request.timeout.unwrap_or_default())
            } else {
                ApiError::transport(&operation, e)
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(&operation, e))?;

        if !status.is_success() {
            return Err(parse_error_body(status, &body));
        }
        Ok(body.to_vec())
    }
}

impl std::fmt::Debug for ReqwestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestExecutor")
            .field("base_url", &self.base_url.as_str())
            .field("lite_base_url", &self.lite_base_url.as_str())
            .field("lookup_base_url", &self.lookup_base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}
