use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::repository::RepositoryError;
use crate::validation::rules::NO_VALID_FIELDS;
use crate::validation::ValidationError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let correlation_id = Uuid::new_v4().to_string();
        let payload = ErrorResponse {
            error: self.message,
        };

        let mut response = (self.status, Json(payload)).into_response();
        if let Ok(value) = HeaderValue::from_str(&correlation_id) {
            response
                .headers_mut()
                .insert(header::HeaderName::from_static("x-correlation-id"), value);
        }
        response
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error returned by handlers that accept a request body
#[derive(Debug)]
pub enum HandlerError {
    Api(ApiError),
    Validation(ValidationError),
}

impl From<ApiError> for HandlerError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<ValidationError> for HandlerError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            Self::Api(err) => err.into_response(),
            Self::Validation(err) => err.into_response(),
        }
    }
}

/// Map a repository failure onto the response for `operation`.
///
/// Storage details are logged and never sent to the client.
pub fn repository_failure(
    operation: &'static str,
    message: &'static str,
    err: RepositoryError,
) -> HandlerError {
    match err {
        RepositoryError::EmptyUpdate => {
            ValidationError::single("body", NO_VALID_FIELDS).into()
        }
        RepositoryError::Store(err) => {
            tracing::error!(operation = operation, error = ?err, "database operation failed");
            ApiError::internal(message).into()
        }
    }
}
