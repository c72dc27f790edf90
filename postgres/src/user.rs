//! User account storage.

use chrono::{DateTime, Utc};
use critique_core::ids::UserId;
use critique_core::model::{Role, User};
use critique_core::repo::{Page, UserRepository};
use critique_core::{DomainError, Result};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    bio: String,
    role: String,
    confirmation_code_hash: Option<String>,
    code_issued_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| DomainError::Database(format!("unknown stored role {}", self.role)))?;
        Ok(User {
            id: UserId(self.id),
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role,
            confirmation_code_hash: self.confirmation_code_hash,
            code_issued_at: self.code_issued_at,
        })
    }
}

const USER_SELECT: &str = r"
    SELECT id, username, email, first_name, last_name, bio, role,
           confirmation_code_hash, code_issued_at
    FROM users
";

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    async fn list_users(&self, search: Option<&str>, page: Page) -> Result<Vec<User>> {
        let sql = format!(
            r"
            {USER_SELECT}
            WHERE ($1::text IS NULL OR username ILIKE '%' || $1 || '%')
            ORDER BY username
            LIMIT $2 OFFSET $3
            "
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(search)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to list users: {e}")))?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE username = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to find user: {e}")))?
            .map(UserRow::into_user)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to find user: {e}")))?
            .map(UserRow::into_user)
            .transpose()
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        sqlx::query(
            r"
            INSERT INTO users
                (id, username, email, first_name, last_name, bio, role,
                 confirmation_code_hash, code_issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.0)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.bio)
        .bind(user.role.as_str())
        .bind(&user.confirmation_code_hash)
        .bind(user.code_issued_at)
        .execute(&self.pool)
        .await
        .map_err(crate::db_err(
            "failed to create user",
            "username or email already taken",
        ))?;
        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET username = $2,
                email = $3,
                first_name = $4,
                last_name = $5,
                bio = $6,
                role = $7,
                confirmation_code_hash = $8,
                code_issued_at = $9
            WHERE id = $1
            ",
        )
        .bind(user.id.0)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.bio)
        .bind(user.role.as_str())
        .bind(&user.confirmation_code_hash)
        .bind(user.code_issued_at)
        .execute(&self.pool)
        .await
        .map_err(crate::db_err(
            "failed to update user",
            "username or email already taken",
        ))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user"));
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, username: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Database(format!("failed to begin transaction: {e}")))?;

        // Ratings of titles the user reviewed must be recomputed after
        // the cascade removes their reviews.
        let affected = sqlx::query_scalar::<_, i64>(
            r"
            SELECT DISTINCT r.title_id FROM reviews r
            JOIN users u ON u.id = r.author_id
            WHERE u.username = $1
            ",
        )
        .bind(username)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to collect reviewed titles: {e}")))?;

        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Database(format!("failed to delete user: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user"));
        }

        sqlx::query(
            r"
            UPDATE titles
            SET rating = (SELECT AVG(score)::float8 FROM reviews WHERE title_id = titles.id)
            WHERE id = ANY($1)
            ",
        )
        .bind(&affected)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to recompute ratings: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Database(format!("failed to commit: {e}")))
    }

    async fn set_confirmation_code(
        &self,
        id: UserId,
        code_hash: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET confirmation_code_hash = $2, code_issued_at = $3 WHERE id = $1",
        )
        .bind(id.0)
        .bind(code_hash)
        .bind(issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Database(format!("failed to store code: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user"));
        }
        Ok(())
    }

    async fn clear_confirmation_code(&self, id: UserId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET confirmation_code_hash = NULL, code_issued_at = NULL WHERE id = $1",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Database(format!("failed to clear code: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user"));
        }
        Ok(())
    }
}
