use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::repositories::RepositoryError;
use crate::services::images::ImageStoreError;
use crate::utils::auth::PasswordError;
use crate::utils::response::ApiResponse;

/// Error type returned by every handler and middleware. Rendered as the
/// shared `{ success: false, message, data }` envelope.
#[derive(Debug, Error)]
pub enum AppError {
    /// Field name to list of messages, as produced by `validator`.
    #[error("validation failed")]
    Validation(serde_json::Map<String, Value>),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limit exceeded")]
    TooManyRequests,

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("database error: {0}")]
    Database(#[source] RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error for a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = serde_json::Map::new();
        errors.insert(field.to_string(), json!([message.into()]));
        AppError::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(what) => AppError::Conflict(what),
            other => AppError::Database(other),
        }
    }
}

impl From<ImageStoreError> for AppError {
    fn from(err: ImageStoreError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, data) = match self {
            AppError::Validation(errors) => ("Validation error", json!({ "errors": errors })),
            AppError::BadRequest(error) => ("Bad request", json!({ "error": error })),
            AppError::Unauthorized(error) => ("Unauthorized", json!({ "error": error })),
            AppError::Forbidden(error) => ("Forbidden", json!({ "error": error })),
            AppError::NotFound(error) => ("Not found", json!({ "error": error })),
            AppError::Conflict(error) => ("Conflict", json!({ "error": error })),
            AppError::TooManyRequests => {
                ("Too Many Requests", json!({ "error": "Rate limit exceeded" }))
            }
            AppError::Upstream(details) => {
                tracing::error!(%details, "upstream service failed");
                ("Upstream error", json!({ "error": "External service failed" }))
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                ("Database error", json!({ "error": "Database operation failed" }))
            }
            AppError::Internal(details) => {
                tracing::error!(%details, "internal error");
                ("Internal server error", json!({ "error": "Unexpected server error" }))
            }
        };

        (status, Json(ApiResponse::error_with_data(message, data))).into_response()
    }
}
