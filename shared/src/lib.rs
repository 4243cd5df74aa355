//! Shared types for Studyhall
//!
//! Types used by both the server and the client: the orderable item model,
//! scope keys, the reorder planner, wire DTOs and the unified error system.

pub mod error;
pub mod models;
pub mod ordering;
pub mod request;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{ItemKind, OrderedItem, ScopeKey, ScopeRecord};
pub use ordering::{Direction, Ordered, ReorderPlan, ShiftPlan, ShiftedItem};
