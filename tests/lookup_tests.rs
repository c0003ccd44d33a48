// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tests for single-key lookups through the client facade
//!
//! Covers request paths, cache keys, single-flight de-duplication of
//! concurrent lookups, and deadline handling.

mod helpers;

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use helpers::{canned_response, init_tracing, CountingCache, MockExecutor, ReadOnlyCache};
use ipinfo_client::cache::{CacheBackend, Origin};
use ipinfo_client::transport::Method;
use ipinfo_client::{ApiError, CacheError, Client, Field, IpinfoError, LookupValue};

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn cached_client(mock: &MockExecutor, cache: &CountingCache) -> Client {
    Client::builder()
        .executor(mock.clone())
        .cache(cache.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_second_lookup_is_served_from_cache() -> anyhow::Result<()> {
    init_tracing();
    let mock = MockExecutor::canned();
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    let first = client.get_ip_info(Some(ip("8.8.8.8"))).await?;
    let second = client.get_ip_info(Some(ip("8.8.8.8"))).await?;

    assert_eq!(first, second);
    assert_eq!(first.country_name, "United States");
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.requests()[0].path, "8.8.8.8/json");
    assert!(matches!(
        cache.get("8.8.8.8").await?,
        LookupValue::Details(_)
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_share_one_request() {
    let mock = MockExecutor::canned().with_delay(|_| Some(Duration::from_millis(100)));
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_asn_details("AS15169").await })
        })
        .collect();

    for handle in handles {
        let details = handle.await.unwrap().unwrap();
        assert_eq!(details.name, "AS15169 Example Networks");
    }
    assert_eq!(mock.calls(), 1);
    assert_eq!(cache.sets(), 1);
    assert_eq!(client.cache().unwrap().in_flight_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_share_one_error() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let mock = MockExecutor::new(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Err(ApiError::status(503, "Unavailable", format!("attempt {n}")))
    })
    .with_delay(|_| Some(Duration::from_millis(100)));
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_resproxy(ip("1.2.3.4")).await })
        })
        .collect();

    for handle in handles {
        match handle.await.unwrap() {
            Err(IpinfoError::Api(ApiError::Status { status, message, .. })) => {
                assert_eq!(status, 503);
                assert_eq!(message, "attempt 0");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(cache.sets(), 0);

    // failures are not cached: the next lookup tries again
    assert!(client.get_resproxy(ip("1.2.3.4")).await.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_asn_lookup_normalizes_identifier() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    let details = client.get_asn_details("as15169").await?;
    client.get_asn_details("AS15169").await?;

    assert_eq!(details.asn, "AS15169");
    assert_eq!(details.kind, "isp");
    assert_eq!(details.country_name, "Germany");
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.requests()[0].path, "AS15169/json");
    Ok(())
}

#[tokio::test]
async fn test_field_lookup_uses_composite_key() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    let city = client.get_ip_field(Some(ip("8.8.8.8")), Field::City).await?;
    let again = client.get_ip_field(Some(ip("8.8.8.8")), Field::City).await?;

    assert_eq!(city, "city text");
    assert_eq!(again, city);
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.requests()[0].path, "8.8.8.8/city");
    assert_eq!(
        cache.get("8.8.8.8:city").await?,
        LookupValue::Text("city text".to_string())
    );

    // a different field of the same address is a different key
    client.get_ip_field(Some(ip("8.8.8.8")), Field::Org).await?;
    assert_eq!(mock.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_resproxy_lookup() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    let details = client.get_resproxy(ip("175.107.211.204")).await?;

    assert_eq!(details.ip, "175.107.211.204");
    assert_eq!(details.service, "example-proxy");
    assert_eq!(mock.requests()[0].path, "resproxy/175.107.211.204");
    assert!(cache.get("resproxy:175.107.211.204").await.is_ok());
    Ok(())
}

#[tokio::test]
async fn test_own_address_is_never_cached() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    client.get_ip_info(None).await?;
    client.get_ip_info(None).await?;
    client.get_ip_field(None, Field::Ip).await?;

    assert_eq!(mock.calls(), 3);
    assert_eq!(mock.requests()[0].path, "json");
    assert_eq!(mock.requests()[2].path, "ip");
    assert_eq!(cache.gets(), 0);
    assert_eq!(cache.sets(), 0);
    Ok(())
}

#[tokio::test]
async fn test_bogon_lookup_makes_no_request() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let client = Client::builder().executor(mock.clone()).build()?;

    let details = client.get_ip_info(Some(ip("fe80::1"))).await?;

    assert!(details.bogon);
    assert_eq!(mock.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_is_returned_with_the_value() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let client = Client::builder()
        .executor(mock.clone())
        .cache(ReadOnlyCache)
        .build()?;

    let resolved = client.resolve_ip_info(Some(ip("8.8.8.8"))).await?;
    assert_eq!(resolved.origin, Origin::Computed);
    assert_eq!(resolved.value.country_name, "United States");
    match &resolved.store_error {
        Some(CacheError::Backend { backend, .. }) => assert_eq!(*backend, "ReadOnlyCache"),
        other => panic!("expected a backend error, got {other:?}"),
    }

    let asn = client.resolve_asn_details("AS15169").await?;
    assert!(asn.store_error.is_some());

    // the plain lookup still succeeds
    let details = client.get_ip_info(Some(ip("8.8.8.8"))).await?;
    assert_eq!(details, resolved.value);
    assert_eq!(mock.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_resolve_reports_origin() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);

    let first = client.resolve_ip_field(Some(ip("8.8.8.8")), Field::Org).await?;
    let second = client.resolve_ip_field(Some(ip("8.8.8.8")), Field::Org).await?;
    let bogon = client.resolve_ip_info(Some(ip("10.1.2.3"))).await?;

    assert_eq!(first.origin, Origin::Computed);
    assert!(first.store_error.is_none());
    assert_eq!(second.origin, Origin::Cache);
    assert_eq!(second.value, "org text");
    assert_eq!(bogon.origin, Origin::Local);
    assert_eq!(mock.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_uncached_client_always_fetches() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let client = Client::builder().executor(mock.clone()).build()?;

    client.get_ip_info(Some(ip("1.1.1.1"))).await?;
    client.get_ip_info(Some(ip("1.1.1.1"))).await?;

    assert_eq!(mock.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_summary_posts_addresses() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let cache = CountingCache::new();
    let client = cached_client(&mock, &cache);
    let ips: Vec<IpAddr> = (1..=12).map(|i| IpAddr::from([8, 8, 8, i])).collect();

    let summary = client.get_ip_summary(&ips).await?;

    assert_eq!(summary.total, 12);
    assert_eq!(summary.countries.get("US"), Some(&12));
    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "summarize");
    assert_eq!(cache.sets(), 0);
    Ok(())
}

#[tokio::test]
async fn test_request_deadline_is_enforced() {
    let mock = MockExecutor::canned().with_delay(|_| Some(Duration::from_secs(5)));
    let client = Client::builder()
        .executor(mock.clone())
        .request_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let start = Instant::now();
    let error = client.get_ip_info(Some(ip("8.8.8.8"))).await.unwrap_err();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(error.is_timeout());
    assert!(matches!(error, IpinfoError::Api(ApiError::Timeout { .. })));
    assert_eq!(mock.requests()[0].timeout, Some(Duration::from_millis(100)));
}

#[tokio::test]
async fn test_service_error_is_surfaced() {
    let mock = MockExecutor::new(|request| {
        if request.path.starts_with("AS0") {
            Err(ApiError::status(404, "Wrong ASN", "Please provide a valid ASN"))
        } else {
            canned_response(request)
        }
    });
    let client = Client::builder().executor(mock).build().unwrap();

    let error = client.get_asn_details("AS0").await.unwrap_err();
    match error {
        IpinfoError::Api(ApiError::Status { status, title, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(title, "Wrong ASN");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_spaces_out_requests() -> anyhow::Result<()> {
    let mock = MockExecutor::canned();
    let client = Client::builder()
        .executor(mock.clone())
        .rate_limit(5)
        .build()?;

    let start = Instant::now();
    for i in 1..=6u8 {
        client.get_ip_info(Some(IpAddr::from([8, 8, 4, i]))).await?;
    }

    assert_eq!(mock.calls(), 6);
    assert!(start.elapsed() >= Duration::from_millis(180));
    Ok(())
}
