//! Custom Axum extractors for validated input
//!
//! `ValidatedJson<T>` reads the body as raw JSON, runs it through the rule set
//! of `T` and hands the handler a sanitized value. `PathId` does the same for
//! the `:id` path segment, so a malformed identifier is rejected before any
//! storage call is made.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use shared::DocumentId;
use uuid::Uuid;

use super::rules::{Mode, RuleSet, SanitizedFields};
use crate::error::ApiError;

/// A field-level validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation error response body
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub error: &'static str,
    pub details: Vec<FieldError>,
}

/// Validation error that converts to a 400 response
#[derive(Debug)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let body = ValidationErrorResponse {
            error: "Validation failed",
            details: self.errors,
        };
        let mut response = (StatusCode::BAD_REQUEST, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            response
                .headers_mut()
                .insert(header::HeaderName::from_static("x-correlation-id"), value);
        }
        response
    }
}

/// Request types built from a sanitized body
///
/// Implementors name the rule set that governs them and whether the body
/// creates or updates; `ValidatedJson<T>` does the rest.
pub trait Validatable: Sized {
    const MODE: Mode;

    fn rules() -> &'static RuleSet;

    /// Build the request from fields that already passed every rule
    fn from_fields(fields: SanitizedFields) -> Self;

    fn from_value(body: &Value) -> Result<Self, Vec<FieldError>> {
        Self::rules()
            .apply(body, Self::MODE)
            .map(Self::from_fields)
    }
}

/// Custom JSON extractor that validates and sanitizes input
///
/// Use this instead of `Json<T>` to:
/// 1. Parse JSON from the request body
/// 2. Drop unknown fields, trim strings, coerce numbers and booleans
/// 3. Return every field error in a single 400 response
///
/// ```ignore
/// pub async fn create_item(
///     State(state): State<AppState>,
///     ValidatedJson(input): ValidatedJson<NewItem>,
/// ) -> ApiResult<impl IntoResponse> {
///     // input is already sanitized and validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: Validatable + Send,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|err| {
                let message = match err {
                    JsonRejection::JsonDataError(e) => {
                        format!("Invalid JSON data: {}", e.body_text())
                    }
                    JsonRejection::JsonSyntaxError(e) => {
                        format!("JSON syntax error: {}", e.body_text())
                    }
                    JsonRejection::MissingJsonContentType(_) => {
                        "Content-Type must be application/json".to_string()
                    }
                    JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
                    _ => "Invalid JSON payload".to_string(),
                };
                ValidationError::single("body", message)
            })?;

        let data = T::from_value(&body).map_err(|errors| {
            tracing::debug!(errors = errors.len(), "request body failed validation");
            ValidationError::new(errors)
        })?;

        Ok(ValidatedJson(data))
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for ValidatedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Well-formed document id taken from the `:id` path segment
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub DocumentId);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Invalid id format"))?;

        DocumentId::parse(&raw).map(PathId).map_err(|err| {
            tracing::debug!(id = %raw, error = %err, "rejected malformed id");
            ApiError::bad_request("Invalid id format")
        })
    }
}

/// Builder for accumulating validation errors
#[derive(Debug, Default)]
pub struct ValidationBuilder {
    errors: Vec<FieldError>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    /// Add an error directly
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Add error if condition is true
    pub fn check_condition(
        &mut self,
        condition: bool,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        if condition {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Finish building and return Result
    pub fn build(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use shared::{CategoryChanges, NewItem};

    #[test]
    fn test_validation_builder() {
        let mut builder = ValidationBuilder::new();

        assert!(!builder.has_errors());

        builder
            .add_error("name", "name is required")
            .check_condition(false, "unit", "unit must be a string")
            .check_condition(true, "quantity", "quantity must be 0 or greater");

        assert!(builder.has_errors());

        let errors = builder.build().unwrap_err();
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[1].field, "quantity");
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let response = ValidationError::single("name", "name is required").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-correlation-id"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Validation failed",
                "details": [{ "field": "name", "message": "name is required" }]
            })
        );
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/items")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn extractor_yields_sanitized_value() {
        let ValidatedJson(item) = <ValidatedJson<NewItem> as FromRequest<()>>::from_request(
            json_request(r#"{"name":" Tea "}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(item.name, "Tea");
    }

    #[tokio::test]
    async fn extractor_reports_malformed_json_as_body_error() {
        let rejection = <ValidatedJson<CategoryChanges> as FromRequest<()>>::from_request(
            json_request("{not json"),
            &(),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(rejection.errors.len(), 1);
        assert_eq!(rejection.errors[0].field, "body");
    }
}
