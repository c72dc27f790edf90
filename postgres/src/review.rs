//! Review and comment storage.
//!
//! Every review mutation recomputes the owning title's rating inside
//! the same transaction, so the stored average never drifts from the
//! live review set.

use critique_core::ids::{CommentId, ReviewId, TitleId, UserId};
use critique_core::model::{Comment, Publication, Review};
use critique_core::repo::{NewComment, NewReview, Page, ReviewPatch, ReviewRepository};
use critique_core::{DomainError, Result};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    title_id: i64,
    author_id: uuid::Uuid,
    author: String,
    text: String,
    score: i16,
    pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId(row.id),
            title_id: TitleId(row.title_id),
            score: row.score,
            publication: Publication {
                author_id: UserId(row.author_id),
                author: row.author,
                text: row.text,
                pub_date: row.pub_date,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    review_id: i64,
    author_id: uuid::Uuid,
    author: String,
    text: String,
    pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId(row.id),
            review_id: ReviewId(row.review_id),
            publication: Publication {
                author_id: UserId(row.author_id),
                author: row.author,
                text: row.text,
                pub_date: row.pub_date,
            },
        }
    }
}

const REVIEW_SELECT: &str = r"
    SELECT r.id, r.title_id, r.author_id, u.username AS author,
           r.text, r.score, r.pub_date
    FROM reviews r
    JOIN users u ON u.id = r.author_id
";

const COMMENT_SELECT: &str = r"
    SELECT c.id, c.review_id, c.author_id, u.username AS author,
           c.text, c.pub_date
    FROM comments c
    JOIN users u ON u.id = c.author_id
";

/// Recompute a title's stored rating from its current reviews.
async fn recompute_rating(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    title_id: i64,
) -> Result<()> {
    sqlx::query(
        r"
        UPDATE titles
        SET rating = (SELECT AVG(score)::float8 FROM reviews WHERE title_id = $1)
        WHERE id = $1
        ",
    )
    .bind(title_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| DomainError::Database(format!("failed to recompute rating: {e}")))?;
    Ok(())
}

/// PostgreSQL review and comment repository.
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReviewRepository for PgReviewRepository {
    async fn list_reviews(&self, title_id: TitleId, page: Page) -> Result<Vec<Review>> {
        let sql = format!(
            "{REVIEW_SELECT} WHERE r.title_id = $1 ORDER BY r.pub_date LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(title_id.0)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to list reviews: {e}")))?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn get_review(&self, title_id: TitleId, id: ReviewId) -> Result<Review> {
        let sql = format!("{REVIEW_SELECT} WHERE r.id = $1 AND r.title_id = $2");
        sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.0)
            .bind(title_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to get review: {e}")))?
            .map(Review::from)
            .ok_or(DomainError::not_found("review"))
    }

    async fn create_review(&self, new: &NewReview) -> Result<Review> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Database(format!("failed to begin transaction: {e}")))?;

        let title_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)",
        )
        .bind(new.title_id.0)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to check title: {e}")))?;
        if !title_exists {
            return Err(DomainError::not_found("title"));
        }

        let (id, pub_date) = sqlx::query_as::<_, (i64, chrono::DateTime<chrono::Utc>)>(
            r"
            INSERT INTO reviews (title_id, author_id, text, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, pub_date
            ",
        )
        .bind(new.title_id.0)
        .bind(new.author_id.0)
        .bind(&new.text)
        .bind(new.score)
        .fetch_one(&mut *tx)
        .await
        .map_err(crate::db_err(
            "failed to create review",
            "you have already reviewed this title",
        ))?;

        recompute_rating(&mut tx, new.title_id.0).await?;
        tx.commit()
            .await
            .map_err(|e| DomainError::Database(format!("failed to commit: {e}")))?;

        Ok(Review {
            id: ReviewId(id),
            title_id: new.title_id,
            score: new.score,
            publication: Publication {
                author_id: new.author_id,
                author: new.author.clone(),
                text: new.text.clone(),
                pub_date,
            },
        })
    }

    async fn update_review(
        &self,
        title_id: TitleId,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> Result<Review> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Database(format!("failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            r"
            UPDATE reviews
            SET text = COALESCE($3, text),
                score = COALESCE($4, score)
            WHERE id = $1 AND title_id = $2
            ",
        )
        .bind(id.0)
        .bind(title_id.0)
        .bind(&patch.text)
        .bind(patch.score)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to update review: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("review"));
        }

        recompute_rating(&mut tx, title_id.0).await?;
        tx.commit()
            .await
            .map_err(|e| DomainError::Database(format!("failed to commit: {e}")))?;

        self.get_review(title_id, id).await
    }

    async fn delete_review(&self, title_id: TitleId, id: ReviewId) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Database(format!("failed to begin transaction: {e}")))?;

        // Comments go with the review via FK cascade.
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND title_id = $2")
            .bind(id.0)
            .bind(title_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Database(format!("failed to delete review: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("review"));
        }

        recompute_rating(&mut tx, title_id.0).await?;
        tx.commit()
            .await
            .map_err(|e| DomainError::Database(format!("failed to commit: {e}")))
    }

    async fn list_comments(&self, review_id: ReviewId, page: Page) -> Result<Vec<Comment>> {
        let sql = format!(
            "{COMMENT_SELECT} WHERE c.review_id = $1 ORDER BY c.pub_date LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(review_id.0)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to list comments: {e}")))?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn get_comment(&self, review_id: ReviewId, id: CommentId) -> Result<Comment> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = $1 AND c.review_id = $2");
        sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id.0)
            .bind(review_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to get comment: {e}")))?
            .map(Comment::from)
            .ok_or(DomainError::not_found("comment"))
    }

    async fn create_comment(&self, new: &NewComment) -> Result<Comment> {
        let review_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE id = $1)",
        )
        .bind(new.review_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Database(format!("failed to check review: {e}")))?;
        if !review_exists {
            return Err(DomainError::not_found("review"));
        }

        let (id, pub_date) = sqlx::query_as::<_, (i64, chrono::DateTime<chrono::Utc>)>(
            r"
            INSERT INTO comments (review_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, pub_date
            ",
        )
        .bind(new.review_id.0)
        .bind(new.author_id.0)
        .bind(&new.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Database(format!("failed to create comment: {e}")))?;

        Ok(Comment {
            id: CommentId(id),
            review_id: new.review_id,
            publication: Publication {
                author_id: new.author_id,
                author: new.author.clone(),
                text: new.text.clone(),
                pub_date,
            },
        })
    }

    async fn update_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
        text: &str,
    ) -> Result<Comment> {
        let result = sqlx::query("UPDATE comments SET text = $3 WHERE id = $1 AND review_id = $2")
            .bind(id.0)
            .bind(review_id.0)
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to update comment: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("comment"));
        }
        self.get_comment(review_id, id).await
    }

    async fn delete_comment(&self, review_id: ReviewId, id: CommentId) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND review_id = $2")
            .bind(id.0)
            .bind(review_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to delete comment: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("comment"));
        }
        Ok(())
    }
}
