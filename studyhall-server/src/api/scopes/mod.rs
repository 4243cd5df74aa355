//! Scope API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/scopes | POST | claim a scope for the caller |
//! | /api/scopes/{kind}/{parent} | GET | ownership record (owner only) |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/scopes", post(handler::claim))
        .route("/api/scopes/{kind}/{parent}", get(handler::get))
}
