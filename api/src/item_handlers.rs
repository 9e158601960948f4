use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use shared::{Item, ItemChanges, ItemPayload, NewItem};

use crate::{
    error::{repository_failure, ApiError, HandlerError},
    state::AppState,
    validation::{PathId, ValidatedJson},
};

/// List every item
#[utoipa::path(
    get,
    path = "/items",
    tag = "Items",
    responses(
        (status = 200, description = "All items", body = [Item]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, HandlerError> {
    let items = state
        .items
        .list_all()
        .await
        .map_err(|err| repository_failure("list_items", "Failed to fetch items", err))?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "Items",
    params(("id" = String, Path, description = "24-character hex identifier")),
    responses(
        (status = 200, description = "The item", body = Item),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<Item>, HandlerError> {
    let item = state
        .items
        .get_by_id(id)
        .await
        .map_err(|err| repository_failure("get_item", "Failed to fetch item", err))?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/items",
    tag = "Items",
    request_body = ItemPayload,
    security(("session_cookie" = [])),
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Login required"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewItem>,
) -> Result<impl IntoResponse, HandlerError> {
    let item = state
        .items
        .create(input)
        .await
        .map_err(|err| repository_failure("create_item", "Failed to create item", err))?;

    tracing::info!(item_id = %item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace the supplied fields of an item
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "Items",
    params(("id" = String, Path, description = "24-character hex identifier")),
    request_body = ItemPayload,
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Updated item", body = Item),
        (status = 400, description = "Invalid id or validation failed"),
        (status = 401, description = "Login required"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidatedJson(changes): ValidatedJson<ItemChanges>,
) -> Result<Json<Item>, HandlerError> {
    let item = state
        .items
        .update(id, &changes)
        .await
        .map_err(|err| repository_failure("update_item", "Failed to update item", err))?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "Items",
    params(("id" = String, Path, description = "24-character hex identifier")),
    security(("session_cookie" = [])),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Invalid id format"),
        (status = 401, description = "Login required"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<StatusCode, HandlerError> {
    let deleted = state
        .items
        .delete(id)
        .await
        .map_err(|err| repository_failure("delete_item", "Failed to delete item", err))?;

    if !deleted {
        return Err(ApiError::not_found("Item not found").into());
    }
    tracing::info!(item_id = %id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}
