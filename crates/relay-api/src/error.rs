//! API error types and JSON error response formatting.
//!
//! The web client only reads `message`; `error` carries a stable code for
//! everything else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use relay_chat::ChatError;
use relay_core::text;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code ("bad_request", "internal_error").
    pub error: String,
    /// Human-readable message shown to the user.
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request.
    BadRequest(String),
    /// 500 Internal Server Error.
    Internal(String),
}

impl ApiError {
    pub fn invalid_request() -> Self {
        ApiError::BadRequest(text::INVALID_REQUEST.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg),
            ApiError::Internal(msg) => ("internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Errors from the send path. Read-path storage failures map to
/// [`text::FETCH_FAILED`] at the handler instead.
impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        if err.is_invalid_request() {
            return ApiError::invalid_request();
        }
        error!(error = %err, "Chat request failed");
        ApiError::Internal(text::PROCESS_FAILED.to_string())
    }
}
