// tests/common/mod.rs
//
// Shared harness for the router-level tests: builds the full application over
// an in-memory store and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use api::auth::SessionUser;
use api::config::AppConfig;
use api::store::MemoryStore;
use api::{build_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn config(items_require_auth: bool) -> AppConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("MONGODB_URI", "mongodb://localhost:27017".to_string()),
        ("DB_NAME", "shopping_test".to_string()),
        ("SESSION_SECRET", "integration-secret".to_string()),
        ("ITEMS_REQUIRE_AUTH", items_require_auth.to_string()),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config must load")
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_items_auth(true)
    }

    pub fn with_items_auth(items_require_auth: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), &config(items_require_auth));
        Self { state, store }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// `Cookie` header value for a logged-in user
    pub fn session_cookie(&self) -> String {
        let user = SessionUser {
            google_id: "109876543210".to_string(),
            display_name: "Test Shopper".to_string(),
            email: Some("shopper@example.com".to_string()),
        };
        let token = self.state.sessions.issue(&user).expect("session must be issued");
        format!("sid={}", token)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(request(Method::GET, uri, None, None)).await
    }

    /// Send a request carrying a valid session cookie
    pub async fn authed(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let cookie = self.session_cookie();
        self.send(request(method, uri, body, Some(&cookie))).await
    }

    pub async fn anonymous(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(request(method, uri, body, None)).await
    }
}

pub fn request(
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request must build"),
        None => builder.body(Body::empty()).expect("request must build"),
    }
}

pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub const UNKNOWN_ID: &str = "65f1a2b3c4d5e6f708192a3b";
