// tests/categories_api.rs
//
// Router-level tests for /categories. Reads are public; every mutation needs
// a session no matter how item gating is configured.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, UNKNOWN_ID};
use serde_json::{json, Value};

fn dairy() -> Value {
    json!({ "name": "Dairy", "color": "blue", "description": "Milk, cheese and yoghurt" })
}

#[tokio::test]
async fn anonymous_create_is_unauthorized_and_stores_nothing() {
    let app = TestApp::new();

    let response = app.anonymous(Method::POST, "/categories", Some(dairy())).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "error": "Unauthorized (login required)" }));
    assert_eq!(app.store.count("Categories").await, 0);
    assert_eq!(app.store.operations(), 0);
}

#[tokio::test]
async fn crud_lifecycle() {
    let app = TestApp::new();

    let created = app.authed(Method::POST, "/categories", Some(dairy())).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["name"], "Dairy");
    assert!(created.body["createdAt"].is_string());
    let uri = format!("/categories/{}", created.body["_id"].as_str().unwrap());

    // reads need no session
    let fetched = app.get(&uri).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
    assert_eq!(app.get("/categories").await.body, json!([created.body.clone()]));

    let updated = app
        .authed(Method::PUT, &uri, Some(json!({ "color": "  white " })))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["color"], "white");
    assert_eq!(updated.body["description"], created.body["description"]);
    assert_eq!(updated.body["createdAt"], created.body["createdAt"]);

    let deleted = app.authed(Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let again = app.authed(Method::DELETE, &uri, None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.body, json!({ "error": "Category not found" }));
}

#[tokio::test]
async fn create_requires_every_field() {
    let app = TestApp::new();

    let response = app
        .authed(Method::POST, "/categories", Some(json!({ "name": "Bakery", "color": 3 })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["details"],
        json!([
            { "field": "color", "message": "color must be a string" },
            { "field": "description", "message": "description is required" }
        ])
    );
    assert_eq!(app.store.count("Categories").await, 0);
}

#[tokio::test]
async fn update_rejects_blanking_a_required_field() {
    let app = TestApp::new();
    let created = app.authed(Method::POST, "/categories", Some(dairy())).await;
    let uri = format!("/categories/{}", created.body["_id"].as_str().unwrap());

    let response = app.authed(Method::PUT, &uri, Some(json!({ "name": "   " }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["details"],
        json!([{ "field": "name", "message": "name cannot be empty" }])
    );
    assert_eq!(app.get(&uri).await.body["name"], "Dairy");
}

#[tokio::test]
async fn update_may_blank_color() {
    let app = TestApp::new();
    let created = app.authed(Method::POST, "/categories", Some(dairy())).await;
    let uri = format!("/categories/{}", created.body["_id"].as_str().unwrap());

    let response = app.authed(Method::PUT, &uri, Some(json!({ "color": "" }))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["color"], "");
    assert_eq!(response.body["description"], created.body["description"]);
}

#[tokio::test]
async fn ids_are_checked_before_storage() {
    let app = TestApp::new();

    let malformed = app.get("/categories/abc").await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body, json!({ "error": "Invalid id format" }));
    assert_eq!(app.store.operations(), 0);

    let unknown = app.get(&format!("/categories/{}", UNKNOWN_ID)).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body, json!({ "error": "Category not found" }));
}

#[tokio::test]
async fn list_failure_is_reported_generically() {
    let app = TestApp::new();
    app.store.set_unavailable(true);

    let response = app.get("/categories").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({ "error": "Failed to fetch categories" }));
}
