//! Data models
//!
//! Shared between studyhall-server and its clients (via API).
//! Item ids are snowflake `i64`s; scopes are addressed by [`ScopeKey`].

pub mod item;
pub mod scope;

// Re-exports
pub use item::*;
pub use scope::*;
