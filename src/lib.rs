// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Client library for the ipinfo.io IP geolocation and network intelligence API
//!
//! Resolve IP addresses and autonomous systems to location, organization,
//! privacy and residential-proxy attributes, with:
//!
//! - a pluggable cache with single-flight de-duplication, so concurrent
//!   lookups of one key cost one request ([`cache`])
//! - batch lookups that fan out over bounded concurrent chunks and merge
//!   partial results ([`batch`])
//! - lite, core and plus tier lookups, each enriched with country name,
//!   flag, currency and continent ([`countries`])
//! - tower middleware for rate limiting and request logging ([`transport`])
//!
//! ```rust,no_run
//! use ipinfo_client::cache::MemoryCache;
//! use ipinfo_client::{BatchOptions, Client, IpinfoError};
//!
//! # async fn example() -> Result<(), IpinfoError> {
//! let client = Client::builder()
//!     .token(std::env::var("IPINFO_TOKEN").unwrap_or_default())
//!     .cache(MemoryCache::new())
//!     .build()?;
//!
//! let asn = client.get_asn_details("AS15169").await?;
//! println!("{}", asn.name);
//!
//! let batch = client
//!     .get_batch(&["8.8.8.8", "AS321", "1.1.1.1/hostname"], &BatchOptions::default())
//!     .await?;
//! if let Some(error) = batch.error() {
//!     eprintln!("partial result: {error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod bogon;
pub mod cache;
mod client;
pub mod config;
pub mod countries;
mod decode;
mod errors;
mod models;
mod spans;
pub mod transport;

pub use batch::{Batch, BatchOptions, ChunkTimeout};
pub use client::*;
pub use config::ClientConfig;
pub use decode::*;
pub use errors::*;
pub use models::*;
