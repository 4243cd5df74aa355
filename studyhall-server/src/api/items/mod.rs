//! Item API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/scopes/{kind}/{parent}/items | GET | list, sorted by order |
//! | /api/scopes/{kind}/{parent}/items | POST | create at `max + 1` |
//! | /api/scopes/{kind}/{parent}/items/{id} | PUT | rename |
//! | /api/scopes/{kind}/{parent}/items/{id} | DELETE | delete, no compaction |
//! | /api/scopes/{kind}/{parent}/sort-order | PUT | commit a shift plan |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/scopes/{kind}/{parent}/items",
            get(handler::list).post(handler::create),
        )
        .route(
            "/api/scopes/{kind}/{parent}/items/{id}",
            put(handler::update).delete(handler::delete),
        )
        .route("/api/scopes/{kind}/{parent}/sort-order", put(handler::reorder))
}
