// tests/service_api.rs
//
// Service-level routes: banner, health, fallback, API docs and CORS.

mod common;

use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::body::Body;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn root_reports_running() {
    let app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("API is running ✅"));
}

#[tokio::test]
async fn health_follows_store_availability() {
    let app = TestApp::new();

    let healthy = app.get("/health").await;
    assert_eq!(healthy.status, StatusCode::OK);
    assert_eq!(healthy.body["status"], "ok");
    assert!(healthy.body["uptime_secs"].is_u64());

    app.store.set_unavailable(true);
    let degraded = app.get("/health").await;
    assert_eq!(degraded.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(degraded.body["status"], "degraded");
}

#[tokio::test]
async fn unknown_routes_fall_through_to_404() {
    let app = TestApp::new();
    let response = app.get("/shopping-lists").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "error": "Route not found" }));
}

#[tokio::test]
async fn openapi_document_targets_the_callers_host() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .header(header::HOST, "shop.example.com")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["servers"][0]["url"], "https://shop.example.com");
    assert!(response.body["paths"]["/items/{id}"].is_object());
}

#[tokio::test]
async fn openapi_item_security_follows_gating() {
    let gated = TestApp::new().get("/api-docs/openapi.json").await;
    assert!(gated.body["paths"]["/items"]["post"]["security"].is_array());

    let open = TestApp::with_items_auth(false)
        .get("/api-docs/openapi.json")
        .await;
    assert!(open.body["paths"]["/items"]["post"].is_object());
    assert!(open.body["paths"]["/items"]["post"]["security"].is_null());
    assert!(open.body["paths"]["/items/{id}"]["delete"]["security"].is_null());
    assert!(open.body["paths"]["/categories"]["post"]["security"].is_array());
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let app = TestApp::new();
    let response = app.get("/api-docs").await;
    assert_eq!(response.status, StatusCode::OK);
    let html = response.body.as_str().unwrap_or_default();
    assert!(html.contains("/api-docs/openapi.json"));
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/items")
        .header(header::ORIGIN, "https://client.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static("*"))
    );
    let methods = response
        .headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(methods.contains("PUT"));
    assert!(methods.contains("DELETE"));
}
