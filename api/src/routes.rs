use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth_handlers, auth_middleware::require_session, category_handlers, docs, handlers,
    item_handlers, state::AppState,
};

/// Put a route behind the session gate when `enabled`.
///
/// Uses `route_layer`, so the gate runs before the handler's extractors:
/// an anonymous request is rejected before its id or body is looked at.
fn gated(route: MethodRouter<AppState>, state: &AppState, enabled: bool) -> MethodRouter<AppState> {
    if enabled {
        route.route_layer(middleware::from_fn_with_state(state.clone(), require_session))
    } else {
        route
    }
}

pub fn item_routes(state: &AppState) -> Router<AppState> {
    let guard = state.items_require_auth;
    Router::new()
        .route(
            "/items",
            get(item_handlers::list_items)
                .merge(gated(post(item_handlers::create_item), state, guard)),
        )
        .route(
            "/items/:id",
            get(item_handlers::get_item).merge(gated(
                put(item_handlers::update_item).delete(item_handlers::delete_item),
                state,
                guard,
            )),
        )
}

pub fn category_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(category_handlers::list_categories)
                .merge(gated(post(category_handlers::create_category), state, true)),
        )
        .route(
            "/categories/:id",
            get(category_handlers::get_category).merge(gated(
                put(category_handlers::update_category).delete(category_handlers::delete_category),
                state,
                true,
            )),
        )
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google", get(auth_handlers::google_login))
        .route("/auth/google/callback", get(auth_handlers::google_callback))
        .route("/auth/failure", get(auth_handlers::login_failure))
        .route("/logout", get(auth_handlers::logout))
        .route("/me", get(auth_handlers::me))
}

pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .route("/api-docs", get(docs::swagger_ui))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

/// Complete application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(item_routes(&state))
        .merge(category_routes(&state))
        .merge(auth_routes())
        .merge(docs_routes())
        .merge(health_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

async fn request_logger(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed().as_millis();
    let status = response.status().as_u16();

    tracing::info!("{method} {uri} {status} {elapsed}ms");

    response
}
