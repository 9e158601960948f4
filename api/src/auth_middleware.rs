use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{auth::SessionUser, error::ApiError, state::AppState};

/// Logged-in user, inserted into request extensions by [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

/// Reject requests without a valid session cookie.
///
/// Installed as a route layer, so it runs before the path and body
/// extractors of the guarded handler.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user) = state.sessions.user_from_headers(request.headers()) else {
        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            "rejected request without session"
        );
        return ApiError::unauthorized("Unauthorized (login required)").into_response();
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}
