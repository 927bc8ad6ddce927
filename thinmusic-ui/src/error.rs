//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// thinmusic-common error
    #[error(transparent)]
    Common(#[from] thinmusic_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use thinmusic_common::Error as CommonError;

        let ApiError::Common(err) = self;
        let (status, error_code, message) = match err {
            CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                other.to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
