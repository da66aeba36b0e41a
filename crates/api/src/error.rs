//! HTTP rendering of application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use stowage_shared::AppError;
use tracing::debug;

/// Error returned by handlers. Renders as `{"error": "<message>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        debug!(code = self.0.error_code(), status = status.as_u16(), "Request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
