//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use linkshare_core::error::AppError;

/// Error body nested under `error` in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Client-safe message.
    pub message: String,
}

/// Failure envelope: `{status_message: "error", data: null, error: {..}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `"error"`.
    pub status_message: String,
    /// Always null.
    pub data: Option<serde_json::Value>,
    /// What went wrong.
    pub error: ApiErrorDetail,
}

/// Handler error wrapper so `AppError` can become a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::validation(format!("Invalid request body: {}", rejection.body_text())))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.kind.is_internal() {
            tracing::error!(
                kind = %err.kind,
                error = %err.message,
                location = err.call_site().as_deref().unwrap_or("unknown"),
                "Internal server error"
            );
        } else {
            tracing::debug!(kind = %err.kind, error = %err.message, "Request rejected");
        }

        let code = if err.kind.is_internal() {
            "INTERNAL_ERROR".to_string()
        } else {
            err.kind.to_string()
        };

        let body = ApiErrorResponse {
            status_message: "error".to_string(),
            data: None,
            error: ApiErrorDetail {
                code,
                message: err.public_message().to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
