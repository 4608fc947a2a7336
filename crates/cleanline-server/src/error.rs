//! Server-specific error types
//!
//! One canonical `AppError` wraps every fallible layer below the API —
//! database, storage, rule configuration, queue — and renders the same JSON
//! error envelope regardless of where the failure originated.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cleanline_engine::rule_config::StoreError;
use serde_json::json;
use thiserror::Error;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, AppError>;
pub type ApiResult<T> = std::result::Result<T, AppError>;

/// Application error type. Every handler returns `Result<_, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rule configuration error: {0}")]
    RuleConfig(#[from] StoreError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

impl AppError {
    /// Stable machine-readable code API clients can branch on; stable across
    /// message wording changes.
    fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "INTERNAL_ERROR",
            AppError::RuleConfig(_) => "INVALID_CONFIGURATION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::BadRequest(_) => "VALIDATION_FAILED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Storage(_) => "INTERNAL_ERROR",
            AppError::Queue(_) => "INTERNAL_ERROR",
            AppError::PayloadTooLarge(_) => "FILE_TOO_LARGE",
            AppError::UnsupportedMediaType(_) => "UNSUPPORTED_FILE_TYPE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::RuleConfig(_)
            | AppError::Storage(_)
            | AppError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// User-facing message. Server-fault branches are sanitized; the full
    /// detail still reaches the logs via the `tracing::error!` call below.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred".to_string(),
            AppError::Config(_) => "Server configuration error".to_string(),
            AppError::Io(_) => "An IO error occurred".to_string(),
            AppError::RuleConfig(_) => "Rule configuration operation failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let body = Json(json!({
            "statusCode": status.as_u16(),
            "errorCode": self.error_code(),
            "message": self.public_message(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Sqlx(e) => AppError::Database(e),
            crate::db::DbError::NotFound(msg) => AppError::NotFound(msg),
            crate::db::DbError::Duplicate(msg) => AppError::Conflict(msg),
            crate::db::DbError::Config(msg) => AppError::Config(msg),
        }
    }
}
