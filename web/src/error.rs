//! Error types for web handlers.
//!
//! [`AppError`] bridges [`DomainError`] and HTTP responses,
//! implementing Axum's `IntoResponse`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use critique_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps a status, a user-facing message and a stable machine-readable
/// code. Server-side errors keep their source for logging and never
/// leak it to the client.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { .. } | DomainError::InvalidConfirmationCode => {
                Self::bad_request(err.to_string())
            }
            DomainError::Unauthenticated => Self::unauthorized(err.to_string()),
            DomainError::PermissionDenied => Self::forbidden(err.to_string()),
            DomainError::NotFound { .. } => Self::not_found(err.to_string()),
            DomainError::Conflict(_) => Self::conflict(err.to_string()),
            DomainError::Delivery(detail) => {
                Self::internal("failed to deliver email").with_source(anyhow::anyhow!(detail))
            }
            DomainError::Database(detail) | DomainError::Internal(detail) => {
                Self::internal("an internal error occurred").with_source(anyhow::anyhow!(detail))
            }
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Stable code for client error handling.
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] invalid input");
    }

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (
                DomainError::validation("score", "out of range"),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::InvalidConfirmationCode,
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::PermissionDenied, StatusCode::FORBIDDEN),
            (DomainError::not_found("title"), StatusCode::NOT_FOUND),
            (
                DomainError::Conflict("taken".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Delivery("smtp".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::Database("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (domain, status) in cases {
            assert_eq!(AppError::from(domain).status(), status);
        }
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = AppError::from(DomainError::Database("connection refused".to_string()));
        assert!(!err.message.contains("connection refused"));
    }
}
