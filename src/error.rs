/// Error types for the trending service
///
/// Errors are converted to appropriate HTTP responses for API clients:
/// unresolvable post references become 404s, malformed requests 400s, and
/// store failures 500s that callers may retry.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for trending-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error, Clone)]
pub enum AppError {
    /// Post reference did not resolve to any known post
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or malformed request fields
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The persistence layer failed; retryable by the caller
    #[error("database error: {0}")]
    Database(String),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
