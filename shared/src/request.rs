//! Request types for the HTTP API

use serde::{Deserialize, Serialize};

use crate::models::ItemKind;
use crate::ordering::ShiftPlan;

/// Body of `PUT /api/scopes/{kind}/{parent}/sort-order`
///
/// Scope and owner are taken from the path and the bearer token; the body
/// is exactly the shift plan computed on the client.
pub type ReorderRequest = ShiftPlan<i64>;

/// Body of `POST /api/scopes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimScopeRequest {
    pub kind: ItemKind,
    pub parent: String,
}
