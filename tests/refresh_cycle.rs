//! End-to-end refresh cycles against a mock configuration server.

use std::sync::Arc;

use config_refresh::config::{default_configuration, ChainedServer, Configuration, TrustedCa};
use config_refresh::settings::EtagPolicy;
use config_refresh::RefreshError;

mod common;
use common::{document, gzip, refresher_for, refresher_with, start_config_backend, Reply};

const CA_B: &str = include_str!("fixtures/globalsign_root_ca.pem");
const S1: &str = "fallback.getiantem.org:443";

fn ca_a() -> String {
    default_configuration().trusted_cas[0].cert.clone()
}

/// One server, one trusted CA.
fn single_ca_configuration() -> Configuration {
    let mut cfg = Configuration::default();
    cfg.client.chained_servers.push(ChainedServer {
        addr: S1.into(),
        pipelined: true,
        ..Default::default()
    });
    cfg.trusted_cas.push(TrustedCa {
        common_name: "ca-a".into(),
        cert: ca_a(),
    });
    cfg
}

#[tokio::test]
async fn test_new_trusted_ca_rebuilds_pool_and_routing() {
    let body = gzip(document(&[S1], &[&ca_a(), CA_B], "2.0.0").as_bytes());
    let (addr, _) = start_config_backend(move |_| Reply::ok("\"v1\"", body.clone())).await;
    let (refresher, context, router) = refresher_with(addr, EtagPolicy::OnFetch, single_ca_configuration());

    let pool = refresher.bootstrap().await.unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(router.current().unwrap().generation, 1);

    let snapshot = refresher.refresh().await.unwrap();
    assert_eq!(snapshot.trusted_cas.len(), 2);
    assert_eq!(snapshot.client.chained_servers[0].addr, S1);
    assert_eq!(context.snapshot().version_tag, "2.0.0");

    let state = router.current().unwrap();
    assert_eq!(state.trusted_roots, 2);
    assert_eq!(state.generation, 2);
    assert_eq!(state.masquerades["cloudfront"][0].domain, "cloudfront.net");
}

#[tokio::test]
async fn test_same_document_twice_is_unchanged() {
    let body = gzip(document(&[S1], &[&ca_a()], "1.0.0").as_bytes());
    let (addr, recorded) = start_config_backend(move |_| Reply::ok("\"same\"", body.clone())).await;
    let (refresher, context, router) = refresher_for(addr, EtagPolicy::OnFetch);

    let first = refresher.refresh().await.unwrap();
    let err = refresher.refresh().await.unwrap_err();
    assert!(err.is_unchanged());

    assert!(Arc::ptr_eq(&first, &context.snapshot()));
    assert_eq!(router.current().unwrap().generation, 1);
    assert_eq!(recorded.header(1, "if-none-match").as_deref(), Some("\"same\""));
}

#[tokio::test]
async fn test_not_modified_keeps_cache_and_configuration() {
    let body = gzip(document(&[S1], &[&ca_a()], "1.0.0").as_bytes());
    let (addr, recorded) = start_config_backend(move |n| match n {
        0 => Reply::ok("abc123", body.clone()),
        _ => Reply::status(304),
    })
    .await;
    let (refresher, context, router) = refresher_for(addr, EtagPolicy::OnFetch);

    refresher.refresh().await.unwrap();
    let committed = context.snapshot();
    assert_eq!(context.etag().get().as_deref(), Some("abc123"));
    assert!(recorded.header(0, "if-none-match").is_none());

    let err = refresher.refresh().await.unwrap_err();
    assert!(err.is_unchanged());
    assert_eq!(recorded.header(1, "if-none-match").as_deref(), Some("abc123"));
    assert_eq!(context.etag().get().as_deref(), Some("abc123"));
    assert!(Arc::ptr_eq(&committed, &context.snapshot()));
    assert_eq!(router.current().unwrap().generation, 1);
}

#[tokio::test]
async fn test_request_headers() {
    let (addr, recorded) = start_config_backend(|_| Reply::status(304)).await;
    let (refresher, _, _) = refresher_for(addr, EtagPolicy::OnFetch);

    let _ = refresher.refresh().await;

    assert_eq!(recorded.count(), 1);
    assert_eq!(recorded.header(0, "cache-control").as_deref(), Some("no-cache"));
    assert_eq!(recorded.header(0, "connection").as_deref(), Some("close"));
    assert_eq!(
        recorded.header(0, "lantern-fronted-url"),
        Some(format!("http://{}/fronted/cloud.yaml.gz", addr))
    );
}

#[tokio::test]
async fn test_bad_gzip_never_reaches_updater() {
    let (addr, _) = start_config_backend(|_| Reply::ok("\"x\"", b"plain text, not gzip".to_vec())).await;
    let (refresher, context, router) = refresher_for(addr, EtagPolicy::OnFetch);
    let before = context.snapshot();

    let err = refresher.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::Decompress(_)));
    assert!(Arc::ptr_eq(&before, &context.snapshot()));
    assert!(router.current().is_none());
}

#[tokio::test]
async fn test_server_error_is_request_failed() {
    let (addr, _) = start_config_backend(|_| Reply::status(500)).await;
    let (refresher, context, _) = refresher_for(addr, EtagPolicy::OnFetch);
    let before = context.snapshot();

    let err = refresher.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::RequestFailed { status: 500 }));
    assert!(Arc::ptr_eq(&before, &context.snapshot()));
    assert_eq!(context.etag().get(), None);
}

#[tokio::test]
async fn test_invalid_document_pins_etag_on_fetch() {
    let body = gzip(document(&[], &[&ca_a()], "1.0.0").as_bytes());
    let (addr, _) = start_config_backend(move |_| Reply::ok("\"empty\"", body.clone())).await;
    let (refresher, context, _) = refresher_for(addr, EtagPolicy::OnFetch);
    let before = context.snapshot();

    let err = refresher.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::InvalidConfiguration(_)));
    assert!(Arc::ptr_eq(&before, &context.snapshot()));
    assert_eq!(context.etag().get().as_deref(), Some("\"empty\""));
}

#[tokio::test]
async fn test_on_commit_policy_skips_rejected_etag() {
    let invalid = gzip(document(&[], &[&ca_a()], "1.0.0").as_bytes());
    let valid = gzip(document(&[S1], &[&ca_a()], "1.0.1").as_bytes());
    let (addr, recorded) = start_config_backend(move |n| match n {
        0 => Reply::ok("\"empty\"", invalid.clone()),
        _ => Reply::ok("\"good\"", valid.clone()),
    })
    .await;
    let (refresher, context, _) = refresher_for(addr, EtagPolicy::OnCommit);

    let err = refresher.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::InvalidConfiguration(_)));
    assert_eq!(context.etag().get(), None);

    refresher.refresh().await.unwrap();
    assert!(recorded.header(1, "if-none-match").is_none());
    assert_eq!(context.etag().get().as_deref(), Some("\"good\""));
    assert_eq!(context.snapshot().version_tag, "1.0.1");
}

#[tokio::test]
async fn test_bad_trusted_ca_is_never_committed() {
    let bad = gzip(document(&[S1], &["not a pem"], "3.0.0").as_bytes());
    let good = gzip(document(&[S1], &[&ca_a()], "3.0.1").as_bytes());
    let (addr, _) = start_config_backend(move |n| match n {
        0 | 1 => Reply::ok("\"v3\"", bad.clone()),
        _ => Reply::ok("\"v4\"", good.clone()),
    })
    .await;
    let (refresher, context, router) = refresher_for(addr, EtagPolicy::OnFetch);
    refresher.bootstrap().await.unwrap();
    let before = context.snapshot();

    // The same bad document twice keeps failing; it never becomes live.
    for _ in 0..2 {
        let err = refresher.refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::TrustPool { index: 0, .. }));
        assert!(Arc::ptr_eq(&before, &context.snapshot()));

        let state = router.current().unwrap();
        assert_eq!(state.generation, 1);
        assert_eq!(state.trusted_roots, context.snapshot().trusted_cas.len());
    }

    let snapshot = refresher.refresh().await.unwrap();
    assert_eq!(snapshot.version_tag, "3.0.1");
    let state = router.current().unwrap();
    assert_eq!(state.generation, 2);
    assert_eq!(state.trusted_roots, snapshot.trusted_cas.len());
}

#[tokio::test]
async fn test_on_commit_records_etag_for_unchanged_document() {
    let raw = serde_yaml::to_string(&default_configuration()).unwrap();
    let body = gzip(raw.as_bytes());
    let (addr, recorded) = start_config_backend(move |n| match n {
        0 => Reply::ok("\"d\"", body.clone()),
        _ => Reply::status(304),
    })
    .await;
    let (refresher, context, _) = refresher_for(addr, EtagPolicy::OnCommit);
    let before = context.snapshot();

    let err = refresher.refresh().await.unwrap_err();
    assert!(err.is_unchanged());
    assert_eq!(context.etag().get().as_deref(), Some("\"d\""));
    assert!(Arc::ptr_eq(&before, &context.snapshot()));

    let err = refresher.refresh().await.unwrap_err();
    assert!(err.is_unchanged());
    assert_eq!(recorded.header(1, "if-none-match").as_deref(), Some("\"d\""));
}

#[tokio::test]
async fn test_concurrent_cycles_are_serialized() {
    let body = gzip(document(&[S1], &[&ca_a()], "1.0.0").as_bytes());
    let (addr, recorded) = start_config_backend(move |_| Reply::ok("\"c\"", body.clone())).await;
    let (refresher, _, router) = refresher_for(addr, EtagPolicy::OnFetch);

    let a = tokio::spawn({
        let refresher = refresher.clone();
        async move { refresher.refresh().await }
    });
    let b = tokio::spawn({
        let refresher = refresher.clone();
        async move { refresher.refresh().await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(RefreshError::Unchanged)))
            .count(),
        1
    );
    assert_eq!(router.current().unwrap().generation, 1);

    // The second cycle started only after the first recorded its ETag.
    assert_eq!(recorded.header(1, "if-none-match").as_deref(), Some("\"c\""));
}
