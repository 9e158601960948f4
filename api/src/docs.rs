//! API description and Swagger UI
//!
//! The OpenAPI document is generated from the handler annotations. Its
//! `servers` entry is filled per request from the `Host` and
//! `X-Forwarded-Proto` headers, so "Try it out" targets whatever address the
//! caller used, proxies included.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Html,
    Json,
};
use utoipa::{
    openapi::{
        security::{ApiKey, ApiKeyValue, SecurityScheme},
        server::Server,
    },
    Modify, OpenApi,
};

use crate::auth::{SessionUser, SESSION_COOKIE};
use crate::auth_handlers::{self, MeResponse};
use crate::state::AppState;
use crate::{category_handlers, handlers, item_handlers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shopping List API",
        description = "Items and categories for a shared shopping list. \
                       Category writes, and item writes unless disabled, need a Google login."
    ),
    paths(
        item_handlers::list_items,
        item_handlers::get_item,
        item_handlers::create_item,
        item_handlers::update_item,
        item_handlers::delete_item,
        category_handlers::list_categories,
        category_handlers::get_category,
        category_handlers::create_category,
        category_handlers::update_category,
        category_handlers::delete_category,
        auth_handlers::google_login,
        auth_handlers::google_callback,
        auth_handlers::login_failure,
        auth_handlers::logout,
        auth_handlers::me,
        handlers::health_check,
    ),
    components(schemas(
        shared::Item,
        shared::Category,
        shared::Priority,
        shared::ItemPayload,
        shared::CategoryPayload,
        SessionUser,
        MeResponse,
    )),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "Items", description = "Shopping list items"),
        (name = "Categories", description = "Item categories"),
        (name = "Auth", description = "Google login and sessions"),
        (name = "Health", description = "Service status")
    )
)]
pub struct ApiDoc;

struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// Base URL the caller reached us on
fn server_url(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?.trim();
    if host.is_empty() {
        return None;
    }
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("http");
    Some(format!("{}://{}", proto, host))
}

/// Drop the session requirement from item writes when items are not gated
fn open_item_writes(doc: &mut utoipa::openapi::OpenApi) {
    for path in ["/items", "/items/{id}"] {
        if let Some(item) = doc.paths.paths.get_mut(path) {
            for operation in [&mut item.post, &mut item.put, &mut item.delete]
                .into_iter()
                .flatten()
            {
                operation.security = None;
            }
        }
    }
}

pub async fn openapi_json(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<utoipa::openapi::OpenApi> {
    let mut doc = ApiDoc::openapi();
    if !state.items_require_auth {
        open_item_writes(&mut doc);
    }
    if let Some(url) = server_url(&headers) {
        doc.servers = Some(vec![Server::new(url)]);
    }
    Json(doc)
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_HTML)
}

const SWAGGER_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Shopping List API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({
        url: "/api-docs/openapi.json",
        dom_id: "#swagger-ui",
        withCredentials: true,
      });
    };
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/items",
            "/items/{id}",
            "/categories",
            "/categories/{id}",
            "/auth/google",
            "/me",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("session_cookie"));
    }

    #[test]
    fn server_url_prefers_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("shop.example.com"));
        assert_eq!(server_url(&headers).as_deref(), Some("http://shop.example.com"));

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(server_url(&headers).as_deref(), Some("https://shop.example.com"));
    }

    #[test]
    fn open_item_writes_leaves_categories_gated() {
        let mut doc = ApiDoc::openapi();
        open_item_writes(&mut doc);

        let items = &doc.paths.paths["/items"];
        assert!(items.post.as_ref().unwrap().security.is_none());
        let item = &doc.paths.paths["/items/{id}"];
        assert!(item.put.as_ref().unwrap().security.is_none());
        assert!(item.delete.as_ref().unwrap().security.is_none());

        let categories = &doc.paths.paths["/categories"];
        assert!(categories.post.as_ref().unwrap().security.is_some());
    }

    #[test]
    fn swagger_page_mounts_the_ui() {
        assert!(SWAGGER_HTML.contains(r##"dom_id: "#swagger-ui""##));
        assert!(SWAGGER_HTML.trim_end().ends_with("</html>"));
    }

    #[test]
    fn server_url_needs_a_host() {
        assert_eq!(server_url(&HeaderMap::new()), None);
    }
}
