//! Core module - configuration, state and startup errors
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared handles passed to every handler
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
