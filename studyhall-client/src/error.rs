//! Client error types

use std::collections::HashMap;

use serde_json::Value;
use shared::{AppError, ErrorCategory, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error code
    #[error("API error {code}: {message}")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<HashMap<String, Value>>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Server error code, when the server produced one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        ClientError::Api {
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Why a reorder did not land
///
/// Every variant is recovered by the coordinator (rollback, notify,
/// refetch); none is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// Malformed move (unknown item, bad plan)
    #[error("Invalid move: {0}")]
    Validation(String),

    /// Caller may not reorder this scope
    #[error("Not allowed: {0}")]
    Auth(String),

    /// Server state moved on since the plan was computed
    #[error("Order changed elsewhere: {0}")]
    Conflict(String),

    /// Timeout, offline, server failure
    #[error("Could not reach the server: {0}")]
    Transport(String),
}

impl From<ClientError> for ReorderError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { code, message, .. } => match code {
                ErrorCode::OrderConflict | ErrorCode::ItemNotFound | ErrorCode::NotFound => {
                    ReorderError::Conflict(message)
                }
                ErrorCode::ScopeNotFound => ReorderError::Auth(message),
                ErrorCode::ValidationFailed
                | ErrorCode::InvalidPlan
                | ErrorCode::InvalidRequest
                | ErrorCode::InvalidFormat => ReorderError::Validation(message),
                other => match other.category() {
                    ErrorCategory::Auth | ErrorCategory::Permission => ReorderError::Auth(message),
                    _ => ReorderError::Transport(message),
                },
            },
            other => ReorderError::Transport(other.to_string()),
        }
    }
}
