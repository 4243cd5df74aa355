//! Scope API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::request::ClaimScopeRequest;
use shared::{ApiResponse, AppResult, ScopeKey, ScopeRecord};

use crate::api::scope_from_path;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::ScopeService;

/// POST /api/scopes - claim a scope for the caller
pub async fn claim(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ClaimScopeRequest>,
) -> AppResult<ApiResponse<ScopeRecord>> {
    let scope = ScopeKey::new(payload.kind, payload.parent)?;
    let record = ScopeService::new(state.storage.clone()).claim(&scope, &user.id)?;
    Ok(ApiResponse::success(record))
}

/// GET /api/scopes/{kind}/{parent} - ownership record (owner only)
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((kind, parent)): Path<(String, String)>,
) -> AppResult<ApiResponse<ScopeRecord>> {
    let scope = scope_from_path(&kind, parent)?;
    let record = ScopeService::new(state.storage.clone()).authorize(&scope, &user.id)?;
    Ok(ApiResponse::success(record))
}
