//! HTTP layer of the Critique review API.
//!
//! # Request flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract** the optional caller identity from the bearer token
//! 3. **Check** the operation against the access policy
//! 4. **Validate** the input shape and ranges
//! 5. **Call** the repository (or the signup flow)
//! 6. **Map** the result, or the [`DomainError`], to a response
//!
//! Handlers are generic over the storage backend and email provider,
//! so the integration tests drive the full router against in-memory
//! implementations.
//!
//! [`DomainError`]: critique_core::DomainError

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use config::{Config, EmailMode};
pub use error::AppError;
pub use extract::MaybeAuth;
pub use routes::router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
