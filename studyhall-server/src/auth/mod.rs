//! Authentication
//!
//! - [`JwtService`] - token validation
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] - middleware guarding `/api/`

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
