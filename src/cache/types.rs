// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for cache entry metadata
//!
//! - [`Expiry`]: monotonic deadline after which an entry is no longer served
//! - [`AccessSequence`]: monotonic sequence number for deterministic LRU ordering

use std::time::{Duration, Instant};

/// Point in time after which a cache entry is considered expired
///
/// Based on [`Instant`], so wall-clock adjustments never resurrect or
/// prematurely expire entries.
///
/// # Examples
///
/// ```
/// use ipinfo_client::cache::Expiry;
/// use std::time::Duration;
///
/// let never = Expiry::never();
/// assert!(!never.is_expired());
///
/// let soon = Expiry::after(Some(Duration::ZERO));
/// std::thread::sleep(Duration::from_millis(2));
/// assert!(soon.is_expired());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry(Option<Instant>);

impl Expiry {
    /// An expiry that never elapses
    pub fn never() -> Self {
        Self(None)
    }

    /// Expiry `ttl` from now; `None` means the entry never expires
    pub fn after(ttl: Option<Duration>) -> Self {
        Self(ttl.and_then(|ttl| Instant::now().checked_add(ttl)))
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        match self.0 {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

/// Monotonic sequence number for deterministic LRU ordering
///
/// Lower sequence numbers were touched longer ago.
///
/// # Examples
///
/// ```
/// use ipinfo_client::cache::AccessSequence;
///
/// let seq1 = AccessSequence::default();
/// let seq2 = seq1.next();
/// assert!(seq1 < seq2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct AccessSequence(u64);

impl AccessSequence {
    /// Returns the next sequence number
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}
