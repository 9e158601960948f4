use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    auth::{random_state, read_cookie, SessionUser, STATE_COOKIE},
    error::{ApiError, ApiResult},
    state::AppState,
};

const LOGIN_SUCCESS_REDIRECT: &str = "/api-docs";
const LOGIN_FAILURE_REDIRECT: &str = "/auth/failure";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: SessionUser,
}

fn not_configured() -> ApiError {
    ApiError::service_unavailable("Google login is not configured")
}

/// Start a Google login
#[utoipa::path(
    get,
    path = "/auth/google",
    tag = "Auth",
    responses(
        (status = 303, description = "Redirect to Google's consent page"),
        (status = 503, description = "Google login is not configured")
    )
)]
pub async fn google_login(State(state): State<AppState>) -> ApiResult<Response> {
    let google = state.google.as_ref().ok_or_else(not_configured)?;

    let oauth_state = random_state();
    let url = google.authorize_url(&oauth_state).map_err(|err| {
        tracing::error!(error = %err, "failed to build Google authorize URL");
        not_configured()
    })?;
    let cookie = state.sessions.state_cookie(oauth_state);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie.to_string())]),
        Redirect::to(url.as_str()),
    )
        .into_response())
}

/// Finish a Google login
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "Auth",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "State issued by /auth/google")
    ),
    responses(
        (status = 303, description = "Redirect to /api-docs, or to /auth/failure on error"),
        (status = 503, description = "Google login is not configured")
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Response> {
    let google = state.google.as_ref().ok_or_else(not_configured)?;
    let clear_state = state.sessions.clear_state_cookie().to_string();

    let failure = |reason: &str| {
        tracing::warn!(reason = reason, "Google login failed");
        (
            AppendHeaders([(header::SET_COOKIE, clear_state.clone())]),
            Redirect::to(LOGIN_FAILURE_REDIRECT),
        )
            .into_response()
    };

    if let Some(error) = query.error.as_deref() {
        return Ok(failure(error));
    }

    let expected = read_cookie(&headers, STATE_COOKIE);
    let state_matches = matches!(
        (expected.as_deref(), query.state.as_deref()),
        (Some(expected), Some(received)) if !expected.is_empty() && expected == received
    );
    if !state_matches {
        return Ok(failure("state mismatch"));
    }

    let Some(code) = query.code.as_deref().filter(|code| !code.is_empty()) else {
        return Ok(failure("missing authorization code"));
    };

    let user = match google.login(code).await {
        Ok(user) => user,
        Err(err) => return Ok(failure(&err.to_string())),
    };

    let token = match state.sessions.issue(&user) {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, "failed to issue session");
            return Ok(failure("session signing failed"));
        }
    };

    tracing::info!(google_id = %user.google_id, "user logged in");
    let session = state.sessions.session_cookie(token).to_string();
    Ok((
        AppendHeaders([
            (header::SET_COOKIE, clear_state.clone()),
            (header::SET_COOKIE, session),
        ]),
        Redirect::to(LOGIN_SUCCESS_REDIRECT),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/auth/failure",
    tag = "Auth",
    responses((status = 401, description = "Google login failed"))
)]
pub async fn login_failure() -> ApiError {
    ApiError::unauthorized("Google login failed")
}

#[utoipa::path(
    get,
    path = "/logout",
    tag = "Auth",
    responses((status = 200, description = "Session ended and cookie cleared"))
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.sessions.revoke_from_headers(&headers);
    let cookie = state.sessions.clear_session_cookie();
    (
        AppendHeaders([(header::SET_COOKIE, cookie.to_string())]),
        Json(json!({ "message": "Logged out" })),
    )
}

/// The logged-in user
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<MeResponse>> {
    state
        .sessions
        .user_from_headers(&headers)
        .map(|user| Json(MeResponse { user }))
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))
}
