//! HTTP transports
//!
//! - [`NetworkHttpClient`] - reqwest over the network
//! - [`OneshotHttpClient`] - in-process calls into an axum `Router`
//!   (`in-process` feature)

mod http;
#[cfg(feature = "in-process")]
mod http_oneshot;

pub use self::http::{HttpClient, NetworkHttpClient};
#[cfg(feature = "in-process")]
pub use http_oneshot::OneshotHttpClient;

use ::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{ApiResponse, AppError, ErrorCode};

use crate::{ClientError, ClientResult};

/// Decode an `ApiResponse` envelope into its payload or its error
///
/// Bodies without an envelope (framework rejections, timeouts) are mapped
/// from the HTTP status.
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ClientResult<T> {
    match serde_json::from_slice::<ApiResponse<Value>>(body) {
        Ok(resp) if !status.is_success() || resp.code.is_some_and(|c| c != 0) => {
            let err = resp
                .into_error()
                .unwrap_or_else(|| AppError::new(ErrorCode::from_http_status(status)));
            Err(err.into())
        }
        Ok(resp) => Ok(serde_json::from_value(resp.data.unwrap_or(Value::Null))?),
        Err(_) if !status.is_success() => {
            let text = String::from_utf8_lossy(body);
            let message = if text.trim().is_empty() {
                status.to_string()
            } else {
                text.into_owned()
            };
            Err(AppError::with_message(ErrorCode::from_http_status(status), message).into())
        }
        Err(e) => Err(ClientError::InvalidResponse(format!("JSON parse error: {}", e))),
    }
}
