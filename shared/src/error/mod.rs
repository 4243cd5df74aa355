//! Unified error system for Studyhall
//!
//! - [`ErrorCode`]: standardized numeric codes
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: error with code, message and details
//! - [`ApiResponse`]: the JSON envelope every endpoint returns
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::order_conflict("Item 7 no longer holds order 3")
//!     .with_detail("moved_id", 7);
//! assert_eq!(err.code, ErrorCode::OrderConflict);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(4003));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
