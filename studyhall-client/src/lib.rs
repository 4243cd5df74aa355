//! Studyhall Client
//!
//! Client side of the ordering engine:
//!
//! - [`OptimisticStore`] - per-scope collections, mutated before the server
//!   confirms
//! - [`SyncCoordinator`] - reorder lifecycle: plan, apply, commit, rollback,
//!   refetch
//! - [`StudyhallApi`] - typed HTTP API over an [`HttpClient`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use studyhall_client::{ClientConfig, NetworkHttpClient, StudyhallApi, SyncCoordinator};
//!
//! let config = ClientConfig::new("http://localhost:3000").with_token(token);
//! let api = StudyhallApi::new(NetworkHttpClient::new(&config)?);
//! let sync = SyncCoordinator::new(Arc::new(api));
//!
//! sync.refresh(&scope).await?;
//! sync.reorder(&scope, &moved_id, &target_id).await?;
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod store;
pub mod sync;

pub use api::StudyhallApi;
pub use client::{HttpClient, NetworkHttpClient};
#[cfg(feature = "in-process")]
pub use client::OneshotHttpClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ReorderError};
pub use notify::{ErrorSink, TracingErrorSink};
pub use store::{OptimisticStore, Snapshot};
pub use sync::{Reconciler, RefreshOutcome, ReorderOutcome, SyncCoordinator};

// Re-export shared types
pub use shared::{ItemKind, Ordered, OrderedItem, ReorderPlan, ScopeKey, ShiftPlan};
