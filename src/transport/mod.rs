// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport for the lookup service.
//!
//! Every network call made by the client goes through an [`HttpExecutor`]:
//! a thin async seam that turns an [`ApiRequest`] into the raw response body.
//! [`ReqwestExecutor`] is the production implementation; tests substitute
//! their own.
//!
//! Tower-based middleware layers wrap any executor:
//!
//! - [`RateLimitLayer`]: spaces requests out to stay inside the quota
//! - [`LoggingLayer`]: `tracing` records of method, path, duration and outcome
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ipinfo_client::transport::{LoggingLayer, RateLimitLayer, ReqwestExecutor};
//! use ipinfo_client::ClientConfig;
//! use tower::Layer;
//!
//! let executor = ReqwestExecutor::new(&ClientConfig::from_env())?;
//! let executor = LoggingLayer::new().layer(RateLimitLayer::per_second(10).layer(executor));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ApiError;

mod logging;
mod rate_limit;
mod reqwest_executor;

pub use logging::{LoggingLayer, LoggingService};
pub use rate_limit::{RateLimitLayer, RateLimitService};
pub use reqwest_executor::ReqwestExecutor;

/// HTTP method of an [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Which of the service's APIs a request targets
///
/// Each endpoint has its own base URL in [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Endpoint {
    /// Full details, ASN, field, batch and summary calls
    #[default]
    Standard,
    /// Free country and ASN lookups
    Lite,
    /// Core and plus tier lookups
    Lookup,
}

/// A request against the lookup service
///
/// `path` is relative to the base URL of `endpoint` (`8.8.8.8/json`, `batch`).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<serde_json::Value>,
    /// Deadline for the whole exchange; `None` leaves it to the executor
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// A `GET` request for `path`
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Standard,
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// A `POST` request for `path` with a JSON body
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            endpoint: Endpoint::Standard,
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            timeout: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Short description used in logs and errors, e.g. `GET 8.8.8.8/json`
    pub fn operation(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Executes requests against the lookup service
///
/// Implementations return the body of a 2xx response and map everything else
/// onto [`ApiError`]. They must not retry on their own.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError>;
}

#[async_trait]
impl<T> HttpExecutor for Arc<T>
where
    T: HttpExecutor + ?Sized,
{
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        (**self).execute(request).await
    }
}
