// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based logging layer for HTTP executors.
//!
//! This module implements a logging layer that uses `tracing` to record
//! request/response information for debugging and observability.

use std::time::Instant;

use async_trait::async_trait;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

use super::{ApiRequest, HttpExecutor};
use crate::errors::ApiError;

/// A Tower layer that adds logging/tracing to API requests.
///
/// This layer wraps each request in a tracing span and logs timing
/// information, request details, and any errors that occur.
///
/// # Example
///
/// ```rust,ignore
/// use ipinfo_client::transport::{LoggingLayer, ReqwestExecutor};
/// use ipinfo_client::ClientConfig;
/// use tower::Layer;
///
/// let executor = LoggingLayer::new().layer(ReqwestExecutor::new(&ClientConfig::default())?);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LoggingLayer {
    /// Whether to log request bodies (can be verbose)
    log_requests: bool,
    /// Whether to log response bodies (can be verbose)
    log_responses: bool,
}

impl LoggingLayer {
    /// Creates a new logging layer with default settings.
    ///
    /// By default, only timing and errors are logged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables logging of request bodies.
    ///
    /// Warning: This can be verbose for large requests.
    pub fn with_request_logging(mut self) -> Self {
        self.log_requests = true;
        self
    }

    /// Enables logging of response bodies.
    ///
    /// Warning: This can be verbose for large responses.
    pub fn with_response_logging(mut self) -> Self {
        self.log_responses = true;
        self
    }

    /// Enables logging of both request and response bodies.
    pub fn verbose(mut self) -> Self {
        self.log_requests = true;
        self.log_responses = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            log_requests: self.log_requests,
            log_responses: self.log_responses,
        }
    }
}

/// An executor that logs API requests and responses.
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    log_requests: bool,
    log_responses: bool,
}

#[async_trait]
impl<S> HttpExecutor for LoggingService<S>
where
    S: HttpExecutor,
{
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let operation = request.operation();
        let span = tracing::info_span!(
            "api_call",
            method = %request.method,
            path = %request.path,
            duration_ms = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();

            if self.log_requests {
                trace!(query = ?request.query, body = ?request.body, "API request: {operation}");
            } else {
                debug!("API request: {operation}");
            }

            let result = self.service.execute(request).await;
            let duration = start.elapsed();

            tracing::Span::current().record("duration_ms", duration.as_millis() as u64);

            match &result {
                Ok(body) => {
                    if self.log_responses {
                        trace!(
                            body = %String::from_utf8_lossy(body),
                            duration_ms = %duration.as_millis(),
                            "API response: {operation}"
                        );
                    } else {
                        debug!(
                            bytes = body.len(),
                            duration_ms = %duration.as_millis(),
                            "API response: {operation}"
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        duration_ms = %duration.as_millis(),
                        "API error: {operation}"
                    );
                }
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_layer_default() {
        let layer = LoggingLayer::new();
        assert!(!layer.log_requests);
        assert!(!layer.log_responses);
    }

    #[test]
    fn test_logging_layer_with_request_logging() {
        let layer = LoggingLayer::new().with_request_logging();
        assert!(layer.log_requests);
        assert!(!layer.log_responses);
    }

    #[test]
    fn test_logging_layer_with_response_logging() {
        let layer = LoggingLayer::new().with_response_logging();
        assert!(!layer.log_requests);
        assert!(layer.log_responses);
    }

    #[tokio::test]
    async fn test_logging_service_passes_outcomes_through() {
        struct FixedExecutor;

        #[async_trait]
        impl HttpExecutor for FixedExecutor {
            async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
                match request.path.as_str() {
                    "8.8.8.8/json" => Ok(br#"{"ip":"8.8.8.8"}"#.to_vec()),
                    _ => Err(ApiError::status(404, "Wrong ip", "Please provide a valid IP address")),
                }
            }
        }

        let executor = LoggingLayer::new().verbose().layer(FixedExecutor);

        let body = executor.execute(ApiRequest::get("8.8.8.8/json")).await.unwrap();
        assert_eq!(body, br#"{"ip":"8.8.8.8"}"#.to_vec());

        let error = executor.execute(ApiRequest::get("bogus/json")).await.unwrap_err();
        assert_eq!(error.status_code(), Some(404));
    }

    #[test]
    fn test_logging_layer_verbose() {
        let layer = LoggingLayer::new().verbose();
        assert!(layer.log_requests);
        assert!(layer.log_responses);
    }
}
