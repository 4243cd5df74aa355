//! Item API Handlers
//!
//! Every handler checks that the caller owns the scope before touching it.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{ItemCreate, ItemUpdate};
use shared::request::ReorderRequest;
use shared::{ApiResponse, AppError, AppResult, OrderedItem};

use crate::api::scope_from_path;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::{ScopeService, ServerReconciler};

/// GET /api/scopes/{kind}/{parent}/items - items sorted by order
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((kind, parent)): Path<(String, String)>,
) -> AppResult<ApiResponse<Vec<OrderedItem>>> {
    let scope = scope_from_path(&kind, parent)?;
    ScopeService::new(state.storage.clone()).authorize(&scope, &user.id)?;

    let items = state.storage.list_items(&scope)?;
    Ok(ApiResponse::success(items))
}

/// POST /api/scopes/{kind}/{parent}/items - append an item
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((kind, parent)): Path<(String, String)>,
    Json(payload): Json<ItemCreate>,
) -> AppResult<ApiResponse<OrderedItem>> {
    let scope = scope_from_path(&kind, parent)?;
    ScopeService::new(state.storage.clone()).authorize(&scope, &user.id)?;
    let title = validated_title(&payload.title)?;

    let item = state.storage.create_item(&scope, title)?;
    Ok(ApiResponse::success(item))
}

/// PUT /api/scopes/{kind}/{parent}/items/{id} - rename
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((kind, parent, id)): Path<(String, String, i64)>,
    Json(payload): Json<ItemUpdate>,
) -> AppResult<ApiResponse<OrderedItem>> {
    let scope = scope_from_path(&kind, parent)?;
    ScopeService::new(state.storage.clone()).authorize(&scope, &user.id)?;
    let title = validated_title(&payload.title)?;

    let item = state.storage.rename_item(&scope, id, title)?;
    Ok(ApiResponse::success(item))
}

/// DELETE /api/scopes/{kind}/{parent}/items/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((kind, parent, id)): Path<(String, String, i64)>,
) -> AppResult<ApiResponse<()>> {
    let scope = scope_from_path(&kind, parent)?;
    ScopeService::new(state.storage.clone()).authorize(&scope, &user.id)?;

    state.storage.delete_item(&scope, id)?;
    tracing::info!(scope = %scope, id, "Item deleted");
    Ok(ApiResponse::ok())
}

/// PUT /api/scopes/{kind}/{parent}/sort-order - commit a shift plan
///
/// Responds with the listing after the commit.
pub async fn reorder(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((kind, parent)): Path<(String, String)>,
    Json(payload): Json<ReorderRequest>,
) -> AppResult<ApiResponse<Vec<OrderedItem>>> {
    let scope = scope_from_path(&kind, parent)?;
    let items = ServerReconciler::new(state.storage.clone()).commit(&scope, &user.id, &payload)?;
    Ok(ApiResponse::success(items))
}

const MAX_TITLE_LEN: usize = 200;

fn validated_title(title: &str) -> AppResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title)
}
