use thiserror::Error;

use crate::storage::StorageError;

/// Startup and lifecycle errors
///
/// Request handlers return [`shared::AppError`]; this type only covers what
/// can go wrong before or around serving.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
