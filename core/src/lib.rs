//! Domain core for the Critique review API.
//!
//! This crate holds everything the HTTP and storage layers agree on:
//! entity types, input validation, the role-based access policy, the
//! rating aggregation rule, and the repository traits that storage
//! backends implement.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            critique-web (axum)          │  ← HTTP, JSON, auth tokens
//! ├─────────────────────────────────────────┤
//! │            critique-core                │
//! │  - entities and validation              │  ← no I/O
//! │  - access policy (capability checks)    │
//! │  - rating aggregation                   │
//! │  - repository traits                    │
//! ├─────────────────────────────────────────┤
//! │         critique-postgres / mocks       │  ← storage backends
//! └─────────────────────────────────────────┘
//! ```
//!
//! Handlers never consult ambient request state: the authenticated
//! [`Identity`](policy::Identity) is passed explicitly into every
//! policy check.

pub mod error;
pub mod ids;
pub mod model;
pub mod policy;
pub mod rating;
pub mod repo;
pub mod validate;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export key types for convenience
pub use error::{DomainError, Result};
pub use ids::{CategoryId, CommentId, GenreId, ReviewId, TitleId, UserId};
pub use model::{Category, Comment, Genre, Review, Role, Title, User};
pub use policy::Identity;
