// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request rate limiting for executors.
//!
//! [`RateLimitLayer`] spaces requests out with a generic cell rate algorithm:
//! the limiter tracks the theoretical arrival time of the next request and
//! lets callers run ahead of it by at most one period's worth of requests.
//! A limit of `n` per period therefore allows a burst of `n` requests, after
//! which requests are admitted one every `period / n`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tower::Layer;
use tracing::trace;

use super::{ApiRequest, HttpExecutor};
use crate::errors::ApiError;

/// Limits how many requests per period reach the wrapped executor
///
/// Clones, and every service built from one layer, share the same budget.
///
/// ```rust
/// use ipinfo_client::transport::RateLimitLayer;
/// use std::time::Duration;
///
/// // the free tier's 50k lookups a month, averaged out
/// let monthly = RateLimitLayer::new(50_000, Duration::from_secs(30 * 24 * 3600));
/// let burst = RateLimitLayer::per_second(20);
/// assert_eq!(burst.requests(), 20);
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    limiter: Arc<Limiter>,
}

impl RateLimitLayer {
    /// At most `requests` per `period`; a count of zero is treated as one
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            limiter: Arc::new(Limiter::new(requests.max(1), period)),
        }
    }

    /// At most `requests` per second
    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }

    /// Requests admitted per period
    pub fn requests(&self) -> u32 {
        self.limiter.requests
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            limiter: Arc::clone(&self.limiter),
        }
    }
}

#[derive(Debug)]
struct Limiter {
    requests: u32,
    /// Spacing between requests once the burst is spent
    interval: Duration,
    /// How far ahead of the schedule callers may run
    tolerance: Duration,
    /// Theoretical arrival time of the next request
    next: Mutex<Instant>,
}

impl Limiter {
    fn new(requests: u32, period: Duration) -> Self {
        let interval = period / requests;
        Self {
            requests,
            interval,
            tolerance: interval * (requests - 1),
            next: Mutex::new(Instant::now()),
        }
    }

    /// Admits a request at `now`, or says how long to wait before retrying
    fn admit(&self, now: Instant) -> Result<(), Duration> {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let scheduled = (*next).max(now);
        let ahead = scheduled - now;

        if ahead > self.tolerance {
            return Err(ahead - self.tolerance);
        }
        *next = scheduled + self.interval;
        Ok(())
    }
}

/// Executor wrapped by a [`RateLimitLayer`]
#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    limiter: Arc<Limiter>,
}

impl<S> RateLimitService<S> {
    async fn wait_for_slot(&self) {
        while let Err(wait) = self.limiter.admit(Instant::now()) {
            trace!(wait_ms = wait.as_millis() as u64, "Rate limited");
            tokio::time::sleep(wait).await;
        }
    }
}

#[async_trait]
impl<S> HttpExecutor for RateLimitService<S>
where
    S: HttpExecutor,
{
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        self.wait_for_slot().await;
        self.service.execute(request).await
    }
}
