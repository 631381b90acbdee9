//! Error responses for the HTTP endpoints

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use routelink_common::{AppError, ErrorResponse};
use serde::Serialize;

/// HTTP-facing wrapper around [`AppError`]
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self.0, "Server error occurred");
        }

        let body = ErrorBody {
            error: ErrorResponse::from(&self.0),
        };

        (status, Json(body)).into_response()
    }
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    AppError::not_found(uri.path()).into()
}
