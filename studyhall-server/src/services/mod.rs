//! Services
//!
//! - [`ScopeService`] - scope claims and ownership checks
//! - [`ServerReconciler`] - verified, atomic reorder commits

pub mod reconciler;
pub mod scopes;

pub use reconciler::ServerReconciler;
pub use scopes::ScopeService;
