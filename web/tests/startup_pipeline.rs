//! Middleware pipeline tests: headers, redirects, negotiation and fallbacks.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use car_boilerplate_testing::helpers::seeded_repository;
use car_boilerplate_web::config::CacheProfile;
use car_boilerplate_web::{CORRELATION_ID_HEADER, Environment, Settings, Startup};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

fn app(settings: Settings) -> Router {
    let startup = Startup::new(settings);
    let state = startup.configure_services(Arc::new(seeded_repository()), CancellationToken::new());
    startup.configure(state).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn every_response_carries_security_headers() {
    let response = app(Settings::default()).oneshot(get("/cars/1")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(
        headers.get(header::REFERRER_POLICY).unwrap(),
        "no-referrer-when-downgrade"
    );
    assert!(headers.get(header::CONTENT_SECURITY_POLICY).is_some());
    assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
}

#[tokio::test]
async fn production_adds_strict_transport_security() {
    let settings = Settings {
        environment: Environment::Production,
        ..Settings::default()
    };

    let response = app(settings).oneshot(get("/health")).await.unwrap();

    assert!(response.headers().get(header::STRICT_TRANSPORT_SECURITY).is_some());
}

#[tokio::test]
async fn correlation_id_is_echoed() {
    let id = Uuid::new_v4();
    let request = Request::builder()
        .uri("/health")
        .header(CORRELATION_ID_HEADER, id.to_string())
        .body(Body::empty())
        .unwrap();

    let response = app(Settings::default()).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(CORRELATION_ID_HEADER).unwrap(),
        id.to_string().as_str()
    );
}

#[tokio::test]
async fn non_canonical_get_is_redirected_permanently() {
    let response = app(Settings::default())
        .oneshot(get("/Cars/1/?x=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/cars/1?x=1");
}

#[tokio::test]
async fn non_canonical_post_is_not_redirected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/Cars")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"make":"Kia","model":"Rio"}"#))
        .unwrap();

    let response = app(Settings::default()).oneshot(request).await.unwrap();

    assert_ne!(response.status(), StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn canonical_redirects_can_be_disabled() {
    let mut settings = Settings::default();
    settings.server.lowercase_urls = false;
    settings.server.trim_trailing_slash = false;

    let response = app(settings).oneshot(get("/Cars")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cars_reject_clients_that_cannot_take_json() {
    let request = Request::builder()
        .uri("/cars")
        .header(header::ACCEPT, "text/xml")
        .body(Body::empty())
        .unwrap();

    let response = app(Settings::default()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn robots_txt_follows_settings() {
    let mut settings = Settings::default();
    settings.app.allow_indexing = false;
    settings.app.site_url = Some("https://cars.example.com".to_string());

    let response = app(settings).oneshot(get("/robots.txt")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=86400"
    );
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(
        body_text(response).await,
        "User-agent: *\nDisallow: /\nSitemap: https://cars.example.com/sitemap.xml\n"
    );
}

#[tokio::test]
async fn car_cache_profile_is_configurable() {
    let mut settings = Settings::default();
    settings
        .app
        .cache_profiles
        .insert("car".to_string(), CacheProfile::public(5));

    let response = app(settings).oneshot(get("/cars/1")).await.unwrap();

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=5"
    );
}

#[tokio::test]
async fn unknown_paths_get_json_not_found() {
    let response = app(Settings::default())
        .oneshot(get("/nowhere"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn readiness_reports_store_health() {
    let response = app(Settings::default())
        .oneshot(get("/health/ready"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "Healthy");
}

#[tokio::test]
async fn leading_slash_runs_redirect_to_a_local_path() {
    for uri in ["//Evil.com/", "///Evil.com"] {
        let response = app(Settings::default()).oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "/Evil.com", "redirect for {uri}");
    }
}

#[tokio::test]
async fn repeated_accept_headers_are_negotiated_together() {
    let request = Request::builder()
        .uri("/cars/1")
        .header(header::ACCEPT, "text/html")
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();

    let response = app(Settings::default()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_car_is_not_cached() {
    let response = app(Settings::default()).oneshot(get("/cars/99")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
}

#[tokio::test]
async fn sitemap_lists_every_car_under_the_site_url() {
    let mut settings = Settings::default();
    settings.app.site_url = Some("https://cars.example.com/".to_string());

    let response = app(settings).oneshot(get("/sitemap.xml")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=3600"
    );
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/xml")
    );
    let xml = body_text(response).await;
    for loc in [
        "https://cars.example.com/cars",
        "https://cars.example.com/cars/1",
        "https://cars.example.com/cars/2",
        "https://cars.example.com/cars/3",
    ] {
        assert!(xml.contains(&format!("<loc>{loc}</loc>")), "missing {loc} in {xml}");
    }
}

#[tokio::test]
async fn sitemap_without_site_url_is_not_found() {
    let response = app(Settings::default()).oneshot(get("/sitemap.xml")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
}
