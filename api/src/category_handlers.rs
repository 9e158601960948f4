use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use shared::{Category, CategoryChanges, CategoryPayload, NewCategory};

use crate::{
    error::{repository_failure, ApiError, HandlerError},
    state::AppState,
    validation::{PathId, ValidatedJson},
};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "All categories", body = [Category]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, HandlerError> {
    let categories = state.categories.list_all().await.map_err(|err| {
        repository_failure("list_categories", "Failed to fetch categories", err)
    })?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "24-character hex identifier")),
    responses(
        (status = 200, description = "The category", body = Category),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<Category>, HandlerError> {
    let category = state
        .categories
        .get_by_id(id)
        .await
        .map_err(|err| repository_failure("get_category", "Failed to fetch category", err))?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "Categories",
    request_body = CategoryPayload,
    security(("session_cookie" = [])),
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Login required"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewCategory>,
) -> Result<impl IntoResponse, HandlerError> {
    let category = state.categories.create(input).await.map_err(|err| {
        repository_failure("create_category", "Failed to create category", err)
    })?;

    tracing::info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "24-character hex identifier")),
    request_body = CategoryPayload,
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Updated category", body = Category),
        (status = 400, description = "Invalid id or validation failed"),
        (status = 401, description = "Login required"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidatedJson(changes): ValidatedJson<CategoryChanges>,
) -> Result<Json<Category>, HandlerError> {
    let category = state
        .categories
        .update(id, &changes)
        .await
        .map_err(|err| repository_failure("update_category", "Failed to update category", err))?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "24-character hex identifier")),
    security(("session_cookie" = [])),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Invalid id format"),
        (status = 401, description = "Login required"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<StatusCode, HandlerError> {
    let deleted = state.categories.delete(id).await.map_err(|err| {
        repository_failure("delete_category", "Failed to delete category", err)
    })?;

    if !deleted {
        return Err(ApiError::not_found("Category not found").into());
    }
    tracing::info!(category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
