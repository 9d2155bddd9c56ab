//! HTTP 接口测试
//!
//! 路由、状态码与稳定错误消息。业务语义的细粒度断言在各服务测试里。

use std::sync::Arc;

use actix_web::{App, test, web};
use serde_json::{Value, json};

use linkpulse::api;
use linkpulse::cache::MokaCache;
use linkpulse::config::GeoIpConfig;
use linkpulse::repository::backends::memory::MemoryRepository;
use linkpulse::services::geoip::GeoIpProvider;
use linkpulse::services::{AnalyticsService, LinkService, RedirectService, VisitRecorder};

const BASE_URL: &str = "http://localhost:8080";

struct TestApp {
    repo: Arc<MemoryRepository>,
    link_service: Arc<LinkService>,
    redirect_service: Arc<RedirectService>,
    analytics_service: Arc<AnalyticsService>,
}

fn build_services() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let cache = Arc::new(MokaCache::new(60));
    let geoip = Arc::new(GeoIpProvider::new(&GeoIpConfig::default()));

    let link_service = Arc::new(LinkService::new(repo.clone(), repo.clone(), BASE_URL));
    let recorder = Arc::new(VisitRecorder::new(repo.clone(), geoip));
    let redirect_service = Arc::new(RedirectService::new(
        cache,
        repo.clone(),
        recorder,
        3600,
    ));
    let analytics_service = Arc::new(AnalyticsService::new(repo.clone(), repo.clone(), BASE_URL));

    TestApp {
        repo,
        link_service,
        redirect_service,
        analytics_service,
    }
}

macro_rules! init_app {
    ($services:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($services.link_service.clone()))
                .app_data(web::Data::new($services.redirect_service.clone()))
                .app_data(web::Data::new($services.analytics_service.clone()))
                .configure(api::configure),
        )
        .await
    };
}

// =============================================================================
// POST /api/shorten
// =============================================================================

#[actix_rt::test]
async fn test_shorten_creates_with_201() {
    let services = build_services();
    let app = init_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(("x-user-id", "1"))
        .set_json(json!({ "longUrl": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Short URL created successfully");
    let short_url = body["shortUrl"].as_str().unwrap();
    assert!(short_url.starts_with(&format!("{}/api/shorten/", BASE_URL)));
    assert!(body["createdAt"].is_string());
}

#[actix_rt::test]
async fn test_shorten_without_identity_is_401() {
    let services = build_services();
    let app = init_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .set_json(json!({ "longUrl": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_shorten_missing_long_url_is_400() {
    let services = build_services();
    let app = init_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(("x-user-id", "1"))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Long URL is required");
}

#[actix_rt::test]
async fn test_shorten_reserved_alias_is_400() {
    let services = build_services();
    let app = init_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(("x-user-id", "1"))
        .set_json(json!({ "longUrl": "https://example.com", "customAlias": "overall" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_shorten_duplicate_custom_alias_is_409() {
    let services = build_services();
    let app = init_app!(services);

    for (i, expected) in [(0, 201), (1, 409)] {
        let req = test::TestRequest::post()
            .uri("/api/shorten")
            .insert_header(("x-user-id", "1"))
            .set_json(json!({
                "longUrl": format!("https://example.com/{}", i),
                "customAlias": "dup"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_rt::test]
async fn test_shorten_email_fallback() {
    let services = build_services();
    services.repo.add_user("bob", "bob@example.com");
    let app = init_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .set_json(json!({
            "longUrl": "https://example.com",
            "emailId": "bob@example.com"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
}

// =============================================================================
// GET /api/shorten/{alias}
// =============================================================================

#[actix_rt::test]
async fn test_redirect_returns_302_with_location() {
    let services = build_services();
    let app = init_app!(services);

    let create = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(("x-user-id", "1"))
        .set_json(json!({ "longUrl": "https://example.com/target", "customAlias": "go" }))
        .to_request();
    test::call_service(&app, create).await;

    let req = test::TestRequest::get().uri("/api/shorten/go").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "https://example.com/target"
    );
}

#[actix_rt::test]
async fn test_redirect_unknown_alias_is_404() {
    let services = build_services();
    let app = init_app!(services);

    let req = test::TestRequest::get()
        .uri("/api/shorten/missing")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Short URL not found");
}

// =============================================================================
// GET /api/analytics/...
// =============================================================================

#[actix_rt::test]
async fn test_analytics_requires_identity() {
    let services = build_services();
    let app = init_app!(services);

    for uri in [
        "/api/analytics/overall",
        "/api/analytics/topic/promo",
        "/api/analytics/someally",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "uri {} should require identity", uri);
    }
}

#[actix_rt::test]
async fn test_analytics_alias_view_after_visits() {
    let services = build_services();
    let app = init_app!(services);

    let create = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(("x-user-id", "1"))
        .set_json(json!({ "longUrl": "https://example.com", "customAlias": "tracked" }))
        .to_request();
    test::call_service(&app, create).await;

    // 同一认证身份访问两次
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/shorten/tracked")
            .insert_header(("x-user-id", "9"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
    }

    let req = test::TestRequest::get()
        .uri("/api/analytics/tracked")
        .insert_header(("x-user-id", "1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalClicks"], 2);
    assert_eq!(body["uniqueClicks"], 1);
    assert!(body["clicksByDate"].is_array());
    assert!(body["osType"].is_array());
    assert!(body["deviceType"].is_array());
}

#[actix_rt::test]
async fn test_analytics_topic_without_links_is_404() {
    let services = build_services();
    let app = init_app!(services);

    let req = test::TestRequest::get()
        .uri("/api/analytics/topic/empty")
        .insert_header(("x-user-id", "1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No URLs found under this topic");
}

#[actix_rt::test]
async fn test_analytics_overall_view() {
    let services = build_services();
    let app = init_app!(services);

    let create = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(("x-user-id", "1"))
        .set_json(json!({ "longUrl": "https://example.com", "customAlias": "mine" }))
        .to_request();
    test::call_service(&app, create).await;

    let visit = test::TestRequest::get()
        .uri("/api/shorten/mine")
        .to_request();
    test::call_service(&app, visit).await;

    let req = test::TestRequest::get()
        .uri("/api/analytics/overall")
        .insert_header(("x-user-id", "1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalUrls"], 1);
    assert_eq!(body["totalClicks"], 1);
    assert_eq!(body["uniqueClicks"], 1);
}
