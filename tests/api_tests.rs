//! HTTP API 集成测试
//!
//! 通过 `build_app` 组装完整的中间件链和路由，用内存存储驱动。

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::{Method, StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::web;
use async_trait::async_trait;
use serde_json::Value;

use shorturl::api::middleware::AUTH_HEADER;
use shorturl::api::services::{AppState, LinkBuilder};
use shorturl::errors::{Result, ShorturlError};
use shorturl::runtime::modes::build_app;
use shorturl::services::geoip::DisabledProvider;
use shorturl::services::shortcode::is_short_code;
use shorturl::services::{GeoInfo, GeoIpLookup, GeoIpProvider};
use shorturl::storage::{MemoryStorage, UrlEntry, UrlMapping, UrlStats, UrlStore};

const TOKEN: &str = "test-token";

// =============================================================================
// 测试替身
// =============================================================================

struct FixedLookup;

#[async_trait]
impl GeoIpLookup for FixedLookup {
    async fn lookup(&self, _ip: &str) -> Result<GeoInfo> {
        Ok(GeoInfo {
            city: Some("City".to_string()),
            country: Some("Country".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "Fixed"
    }
}

/// 所有操作都失败的存储
struct BrokenStore;

#[async_trait]
impl UrlStore for BrokenStore {
    async fn save(&self, _alias: &str, _url: &str) -> Result<()> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn get(&self, _alias: &str) -> Result<Option<String>> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn stats(&self, _alias: &str) -> Result<Option<UrlStats>> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn entry(&self, _alias: &str) -> Result<Option<UrlEntry>> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn update_url(&self, _alias: &str, _new_url: &str) -> Result<()> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn update_stats(&self, _alias: &str, _ip: &str, _referrer: &str, _geo: &str) -> Result<()> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn flush(&self) -> Result<UrlMapping> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn snapshot(&self) -> Result<UrlMapping> {
        Err(ShorturlError::storage("disk on fire"))
    }
    async fn link_count(&self) -> Result<usize> {
        Err(ShorturlError::storage("disk on fire"))
    }
    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

fn state_with(store: Arc<dyn UrlStore>, lookup: Arc<dyn GeoIpLookup>) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        store,
        GeoIpProvider::with_lookup(lookup, Duration::from_millis(500)),
        LinkBuilder::new("http://localhost:8080"),
    ))
}

fn memory_state() -> (Arc<dyn UrlStore>, web::Data<AppState>) {
    let store: Arc<dyn UrlStore> = Arc::new(MemoryStorage::new());
    let state = state_with(store.clone(), Arc::new(DisabledProvider));
    (store, state)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(build_app($state, Arc::from(TOKEN))).await
    };
}

fn authed(method: Method, uri: &str) -> TestRequest {
    TestRequest::default()
        .method(method)
        .uri(uri)
        .insert_header((AUTH_HEADER, TOKEN))
}

// =============================================================================
// /shorten + redirect
// =============================================================================

#[actix_rt::test]
async fn test_shorten_then_redirect() {
    let (store, state) = memory_state();
    let app = init_app!(state);

    let req = authed(Method::POST, "/shorten?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let short_url = body["short_url"].as_str().unwrap();

    let alias = short_url
        .strip_prefix("http://localhost:8080/")
        .expect("short url uses the local base");
    assert!(is_short_code(alias));
    assert_eq!(
        store.get(alias).await.unwrap().as_deref(),
        Some("https://example.com/a?b=c")
    );

    let req = TestRequest::get().uri(&format!("/{}", alias)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://example.com/a?b=c"
    );
    assert_eq!(store.stats(alias).await.unwrap().unwrap().count, 1);
}

#[actix_rt::test]
async fn test_shorten_requires_url() {
    let (store, state) = memory_state();
    let app = init_app!(state);

    for uri in ["/shorten", "/shorten?url="] {
        let resp = test::call_service(&app, authed(Method::GET, uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        assert_eq!(body, "URL parameter is missing");
    }
    assert_eq!(store.link_count().await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_redirect_records_visit() {
    let store: Arc<dyn UrlStore> = Arc::new(MemoryStorage::new());
    store.save("ab12cd", "https://example.com").await.unwrap();
    let app = init_app!(state_with(store.clone(), Arc::new(FixedLookup)));

    for _ in 0..3 {
        let req = TestRequest::get()
            .uri("/ab12cd")
            .peer_addr("1.2.3.4:40000".parse().unwrap())
            .insert_header((header::REFERER, "http://ref"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    let stats = store.stats("ab12cd").await.unwrap().unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.last_ips, vec!["1.2.3.4", "1.2.3.4", "1.2.3.4"]);
    assert_eq!(stats.referrers, vec!["http://ref", "http://ref", "http://ref"]);
    assert_eq!(stats.last_geo_location, "City, Country");
}

#[actix_rt::test]
async fn test_redirect_behind_proxy_uses_forwarded_ip() {
    let store: Arc<dyn UrlStore> = Arc::new(MemoryStorage::new());
    store.save("ab12cd", "https://example.com").await.unwrap();
    let app = init_app!(state_with(store.clone(), Arc::new(DisabledProvider)));

    let req = TestRequest::get()
        .uri("/ab12cd")
        .peer_addr("127.0.0.1:50000".parse().unwrap())
        .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let stats = store.stats("ab12cd").await.unwrap().unwrap();
    assert_eq!(stats.last_ips, vec!["203.0.113.9"]);
    assert!(stats.referrers.is_empty());
    assert_eq!(stats.last_geo_location, "Unknown");
}

#[actix_rt::test]
async fn test_redirect_unknown_alias_is_404() {
    let (_store, state) = memory_state();
    let app = init_app!(state);

    for uri in ["/nope00", "/not-a-generated-code", "/"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(resp).await, "not found");
    }
}

#[actix_rt::test]
async fn test_imported_alias_is_reachable() {
    let (store, state) = memory_state();
    store
        .import(br#"{"my-custom-link":"https://custom.example"}"#)
        .await
        .unwrap();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/my-custom-link").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://custom.example"
    );
}

// =============================================================================
// /stats /update
// =============================================================================

#[actix_rt::test]
async fn test_stats_endpoint() {
    let (store, state) = memory_state();
    store.save("ab12cd", "https://example.com").await.unwrap();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        authed(Method::GET, "/stats?short_url=ab12cd").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!({"count": 0, "last_ips": [], "referrers": [], "last_geo_location": ""})
    );

    let resp = test::call_service(&app, authed(Method::GET, "/stats").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        authed(Method::GET, "/stats?short_url=nope00").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_update_endpoint() {
    let (store, state) = memory_state();
    store.save("ab12cd", "https://old.example").await.unwrap();
    store
        .update_stats("ab12cd", "1.2.3.4", "", "Unknown")
        .await
        .unwrap();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        authed(
            Method::PUT,
            "/update?short_url=ab12cd&new_url=https%3A%2F%2Fnew.example",
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["url"], "ab12cd");
    assert_eq!(body["message"], "URL updated successfully");

    let entry = store.entry("ab12cd").await.unwrap().unwrap();
    assert_eq!(entry.url, "https://new.example");
    assert_eq!(entry.stats.count, 1);
}

#[actix_rt::test]
async fn test_update_validation_and_missing_alias() {
    let (store, state) = memory_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        authed(Method::GET, "/update?short_url=ab12cd").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        test::read_body(resp).await,
        "Both short_url and new_url parameters are required"
    );

    let resp = test::call_service(
        &app,
        authed(Method::GET, "/update?short_url=nope00&new_url=https%3A%2F%2Fx.example").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.get("nope00").await.unwrap(), None);
}

// =============================================================================
// /flush /backup /import
// =============================================================================

#[actix_rt::test]
async fn test_flush_backup_import_cycle() {
    let (store, state) = memory_state();
    store.save("aaaaaa", "https://a.example").await.unwrap();
    store.save("bbbbbb", "https://b.example").await.unwrap();
    let app = init_app!(state);

    let resp = test::call_service(&app, authed(Method::GET, "/backup").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let backup = test::read_body(resp).await;

    let resp = test::call_service(&app, authed(Method::POST, "/flush").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let flushed: Value = test::read_body_json(resp).await;
    assert_eq!(
        flushed,
        serde_json::json!({"aaaaaa": "https://a.example", "bbbbbb": "https://b.example"})
    );
    assert_eq!(store.link_count().await.unwrap(), 0);

    let resp = test::call_service(
        &app,
        authed(Method::POST, "/import")
            .set_payload(backup.to_vec())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "URLs imported successfully");
    assert_eq!(body["imported"], 2);
    assert_eq!(
        store.get("bbbbbb").await.unwrap().as_deref(),
        Some("https://b.example")
    );
}

#[actix_rt::test]
async fn test_import_rejects_malformed_body() {
    let (store, state) = memory_state();
    store.save("keep01", "https://keep.example").await.unwrap();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        authed(Method::POST, "/import")
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test::read_body(resp).await, "Failed to import URLs");
    assert_eq!(store.link_count().await.unwrap(), 1);
}

// =============================================================================
// 中间件
// =============================================================================

#[actix_rt::test]
async fn test_flush_without_token_is_forbidden() {
    let (store, state) = memory_state();
    store.save("ab12cd", "https://example.com").await.unwrap();
    let app = init_app!(state);

    let resp = test::call_service(&app, TestRequest::post().uri("/flush").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        test::read_body(resp).await,
        "Forbidden: Invalid or missing token"
    );

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/flush")
            .insert_header((AUTH_HEADER, "wrong"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    assert_eq!(
        store.get("ab12cd").await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[actix_rt::test]
async fn test_every_management_route_is_gated() {
    let (_store, state) = memory_state();
    let app = init_app!(state);

    for uri in [
        "/shorten?url=https%3A%2F%2Fx.example",
        "/stats?short_url=ab12cd",
        "/update?short_url=a&new_url=b",
        "/flush",
        "/backup",
        "/import",
    ] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{} should be gated", uri);
    }
}

#[actix_rt::test]
async fn test_health_is_open() {
    let (_store, state) = memory_state();
    let app = init_app!(state);

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[actix_rt::test]
async fn test_cors_preflight_skips_token() {
    let (store, state) = memory_state();
    store.save("ab12cd", "https://example.com").await.unwrap();
    let app = init_app!(state);

    let req = TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/flush")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        headers.get("access-control-allow-methods").unwrap(),
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers.get("access-control-allow-headers").unwrap(),
        "Content-Type, Authorization, X-Auth-Token"
    );
    assert_eq!(store.link_count().await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_cors_headers_on_errors() {
    let (_store, state) = memory_state();
    let app = init_app!(state);

    let resp = test::call_service(&app, TestRequest::get().uri("/flush").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

// =============================================================================
// 存储故障
// =============================================================================

#[actix_rt::test]
async fn test_storage_failure_does_not_leak_details() {
    let app = init_app!(state_with(Arc::new(BrokenStore), Arc::new(DisabledProvider)));

    let resp = test::call_service(&app, TestRequest::get().uri("/ab12cd").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(test::read_body(resp).await, "Internal Server Error");

    let resp = test::call_service(
        &app,
        authed(Method::GET, "/shorten?url=https%3A%2F%2Fx.example").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
