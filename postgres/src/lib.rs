//! PostgreSQL storage backend for the Critique review API.
//!
//! One repository struct per domain area, each a thin `Clone`-able
//! wrapper around a shared [`PgPool`]. Queries are plain runtime
//! queries, so the crate builds without a live database.

pub mod catalog;
pub mod review;
pub mod user;

pub use catalog::PgCatalogRepository;
pub use review::PgReviewRepository;
pub use user::PgUserRepository;

// Re-exported so downstream crates do not need their own sqlx
// dependency just to hold a pool.
pub use sqlx::PgPool;

use critique_core::{DomainError, Result};
use sqlx::postgres::PgPoolOptions;

/// Open a connection pool.
///
/// # Errors
///
/// Returns `Database` when the server cannot be reached.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| DomainError::Database(format!("failed to connect: {e}")))
}

/// Run pending migrations.
///
/// # Errors
///
/// Returns `Database` when a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::Database(format!("migration failed: {e}")))?;
    Ok(())
}

/// Map a driver error, turning uniqueness violations into `Conflict`.
pub(crate) fn db_err(context: &str, conflict: &str) -> impl Fn(sqlx::Error) -> DomainError {
    let context = context.to_string();
    let conflict = conflict.to_string();
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return DomainError::Conflict(conflict.clone());
            }
        }
        DomainError::Database(format!("{context}: {e}"))
    }
}
