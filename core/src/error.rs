//! Error taxonomy for domain operations.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Error taxonomy shared by every layer of the service.
///
/// The web layer maps each variant onto an HTTP status; storage
/// backends map driver failures into `Database` and uniqueness
/// violations into `Conflict`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed shape or range validation (HTTP 400).
    #[error("invalid {field}: {message}")]
    Validation {
        /// Field the check failed on.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The request carries no (valid) identity but the operation
    /// requires one (HTTP 401).
    #[error("authentication required")]
    Unauthenticated,

    /// The identity is known but not permitted to do this (HTTP 403).
    #[error("permission denied")]
    PermissionDenied,

    /// A referenced entity does not exist (HTTP 404).
    #[error("{resource} not found")]
    NotFound {
        /// Kind of entity that was missing.
        resource: &'static str,
    },

    /// A uniqueness rule was violated: duplicate review, username or
    /// email already taken (HTTP 409).
    #[error("{0}")]
    Conflict(String),

    /// The confirmation code presented at login did not match
    /// (HTTP 400). Deliberately does not say which field is wrong.
    #[error("invalid confirmation code")]
    InvalidConfirmationCode,

    /// Out-of-band delivery (email) failed. Already-persisted state
    /// is kept (HTTP 500).
    #[error("failed to deliver message")]
    Delivery(String),

    /// Storage backend failure (HTTP 500).
    #[error("database error: {0}")]
    Database(String),

    /// Any other server-side failure, such as token signing (HTTP 500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Shorthand for a validation failure.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a missing entity.
    #[must_use]
    pub const fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    /// Returns `true` if this error is caused by the caller's input
    /// rather than by the service.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Unauthenticated
                | Self::PermissionDenied
                | Self::NotFound { .. }
                | Self::Conflict(_)
                | Self::InvalidConfirmationCode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = DomainError::validation("score", "must be between 1 and 10");
        assert_eq!(err.to_string(), "invalid score: must be between 1 and 10");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_server_errors_are_not_user_errors() {
        assert!(!DomainError::Database("boom".to_string()).is_user_error());
        assert!(!DomainError::Delivery("smtp down".to_string()).is_user_error());
    }
}
