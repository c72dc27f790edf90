//! Repository traits.
//!
//! Storage backends (PostgreSQL in production, in-memory mocks in
//! tests) implement these traits. Methods return `Send` futures so
//! handlers generic over a backend stay spawnable.
//!
//! Ownership rules the backends must uphold:
//! - deleting a title deletes its reviews (and their comments);
//! - deleting a review deletes its comments;
//! - deleting a category nulls the reference on its titles;
//! - at most one review per (title, author) pair;
//! - a review mutation and the title's rating recompute form one
//!   atomic unit.

use crate::error::Result;
use crate::ids::{CommentId, ReviewId, TitleId, UserId};
use crate::model::{Category, Comment, Genre, Review, Title, User};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Limit/offset window for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of rows returned.
    pub limit: i64,
    /// Number of rows skipped.
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// Input for creating a category or genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlugEntry {
    /// Unique display name.
    pub name: String,
    /// Unique URL-safe slug.
    pub slug: String,
}

/// Input for creating a title. Category and genres are referenced by
/// slug, as in the write shape of the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTitle {
    /// Name of the work.
    pub name: String,
    /// Release year.
    pub year: i32,
    /// Optional description.
    pub description: Option<String>,
    /// Category slug, if any.
    pub category: Option<String>,
    /// Genre slugs.
    pub genres: Vec<String>,
}

/// Partial update for a title. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePatch {
    /// New name.
    pub name: Option<String>,
    /// New release year.
    pub year: Option<i32>,
    /// New description.
    pub description: Option<String>,
    /// New category slug.
    pub category: Option<String>,
    /// Replacement genre slugs.
    pub genres: Option<Vec<String>>,
}

/// Filters for listing titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    /// Match titles in the category with this slug.
    pub category: Option<String>,
    /// Match titles tagged with the genre with this slug.
    pub genre: Option<String>,
    /// Match titles released in this year.
    pub year: Option<i32>,
    /// Match titles whose name contains this string.
    pub name: Option<String>,
}

/// Input for creating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Title under review.
    pub title_id: TitleId,
    /// Author's user id.
    pub author_id: UserId,
    /// Author's username.
    pub author: String,
    /// Review text.
    pub text: String,
    /// Score in `[1, 10]`.
    pub score: i16,
}

/// Partial update for a review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    /// New text.
    pub text: Option<String>,
    /// New score.
    pub score: Option<i16>,
}

/// Input for creating a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Review being replied to.
    pub review_id: ReviewId,
    /// Author's user id.
    pub author_id: UserId,
    /// Author's username.
    pub author: String,
    /// Comment text.
    pub text: String,
}

/// Catalog storage: categories, genres and titles.
pub trait CatalogRepository: Send + Sync {
    /// List categories, optionally filtered by a name search.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_categories(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Category>>> + Send;

    /// Create a category.
    ///
    /// # Errors
    ///
    /// `Conflict` when the name or slug is already taken.
    fn create_category(
        &self,
        entry: &NewSlugEntry,
    ) -> impl Future<Output = Result<Category>> + Send;

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// `NotFound` when no category has this slug.
    fn get_category(&self, slug: &str) -> impl Future<Output = Result<Category>> + Send;

    /// Delete a category by slug. Titles referencing it keep existing
    /// with a null category.
    ///
    /// # Errors
    ///
    /// `NotFound` when no category has this slug.
    fn delete_category(&self, slug: &str) -> impl Future<Output = Result<()>> + Send;

    /// List genres, optionally filtered by a name search.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_genres(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Genre>>> + Send;

    /// Create a genre.
    ///
    /// # Errors
    ///
    /// `Conflict` when the name or slug is already taken.
    fn create_genre(&self, entry: &NewSlugEntry) -> impl Future<Output = Result<Genre>> + Send;

    /// Get a genre by slug.
    ///
    /// # Errors
    ///
    /// `NotFound` when no genre has this slug.
    fn get_genre(&self, slug: &str) -> impl Future<Output = Result<Genre>> + Send;

    /// Delete a genre by slug.
    ///
    /// # Errors
    ///
    /// `NotFound` when no genre has this slug.
    fn delete_genre(&self, slug: &str) -> impl Future<Output = Result<()>> + Send;

    /// Create a title, resolving category and genre slugs.
    ///
    /// # Errors
    ///
    /// `Validation` when a referenced slug does not exist.
    fn create_title(&self, new: &NewTitle) -> impl Future<Output = Result<Title>> + Send;

    /// Get a title with category, genres and rating resolved.
    ///
    /// # Errors
    ///
    /// `NotFound` when the title does not exist.
    fn get_title(&self, id: TitleId) -> impl Future<Output = Result<Title>> + Send;

    /// List titles matching the filter.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_titles(
        &self,
        filter: &TitleFilter,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Title>>> + Send;

    /// Partially update a title.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing title, `Validation` for an unknown
    /// category or genre slug.
    fn update_title(
        &self,
        id: TitleId,
        patch: &TitlePatch,
    ) -> impl Future<Output = Result<Title>> + Send;

    /// Delete a title. Cascades to its reviews and their comments.
    ///
    /// # Errors
    ///
    /// `NotFound` when the title does not exist.
    fn delete_title(&self, id: TitleId) -> impl Future<Output = Result<()>> + Send;
}

/// Review and comment storage.
///
/// Every review mutation recomputes the owning title's rating in the
/// same transaction.
pub trait ReviewRepository: Send + Sync {
    /// List a title's reviews.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_reviews(
        &self,
        title_id: TitleId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Review>>> + Send;

    /// Get one review, keyed by title and review id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the review does not exist under this title.
    fn get_review(
        &self,
        title_id: TitleId,
        id: ReviewId,
    ) -> impl Future<Output = Result<Review>> + Send;

    /// Create a review and recompute the title's rating.
    ///
    /// # Errors
    ///
    /// `Conflict` when the author already reviewed this title.
    fn create_review(&self, new: &NewReview) -> impl Future<Output = Result<Review>> + Send;

    /// Update a review and recompute the title's rating.
    ///
    /// # Errors
    ///
    /// `NotFound` when the review does not exist under this title.
    fn update_review(
        &self,
        title_id: TitleId,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> impl Future<Output = Result<Review>> + Send;

    /// Delete a review (and its comments) and recompute the title's
    /// rating.
    ///
    /// # Errors
    ///
    /// `NotFound` when the review does not exist under this title.
    fn delete_review(
        &self,
        title_id: TitleId,
        id: ReviewId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// List a review's comments.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_comments(
        &self,
        review_id: ReviewId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Get one comment, keyed by review and comment id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the comment does not exist under this review.
    fn get_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
    ) -> impl Future<Output = Result<Comment>> + Send;

    /// Create a comment.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    fn create_comment(&self, new: &NewComment) -> impl Future<Output = Result<Comment>> + Send;

    /// Update a comment's text.
    ///
    /// # Errors
    ///
    /// `NotFound` when the comment does not exist under this review.
    fn update_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
        text: &str,
    ) -> impl Future<Output = Result<Comment>> + Send;

    /// Delete a comment.
    ///
    /// # Errors
    ///
    /// `NotFound` when the comment does not exist under this review.
    fn delete_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// User account storage.
pub trait UserRepository: Send + Sync {
    /// List users, optionally filtered by a username search.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_users(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// Look up a user by username.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails. A missing user is `Ok(None)`.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Look up a user by email.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails. A missing user is `Ok(None)`.
    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Create a user.
    ///
    /// # Errors
    ///
    /// `Conflict` when the username or email is already taken.
    fn create_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send;

    /// Update a user (keyed by id).
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing user, `Conflict` when the new
    /// username or email collides with another account.
    fn update_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send;

    /// Delete a user by username. The user's reviews and comments are
    /// removed with the account.
    ///
    /// # Errors
    ///
    /// `NotFound` when no user has this username.
    fn delete_user(&self, username: &str) -> impl Future<Output = Result<()>> + Send;

    /// Store a freshly issued confirmation code hash, replacing any
    /// previous one.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing user.
    fn set_confirmation_code(
        &self,
        id: UserId,
        code_hash: &str,
        issued_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Clear the stored confirmation code after it has been consumed.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing user.
    fn clear_confirmation_code(&self, id: UserId) -> impl Future<Output = Result<()>> + Send;
}
