//! Comment endpoints, nested under a title's review.

use super::{ListParams, page};
use crate::error::AppError;
use crate::extract::MaybeAuth;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use critique_core::model::Comment;
use critique_core::repo::{NewComment, ReviewRepository};
use critique_core::{CommentId, ReviewId, TitleId, policy, validate};
use serde::{Deserialize, Serialize};

/// Request body for creating a comment.
#[derive(Debug, Deserialize)]
pub struct CommentIn {
    /// Comment text.
    pub text: String,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize)]
pub struct CommentPatchIn {
    /// New text.
    pub text: Option<String>,
}

/// Comment as exposed by the API.
#[derive(Debug, Serialize)]
pub struct CommentOut {
    /// Comment id.
    pub id: i64,
    /// Comment text.
    pub text: String,
    /// Author's username.
    pub author: String,
    /// Publication timestamp.
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentOut {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.0,
            text: comment.publication.text,
            author: comment.publication.author,
            pub_date: comment.publication.pub_date,
        }
    }
}

/// 404 unless the review exists under this title.
async fn check_review<R: ReviewRepository>(
    reviews: &R,
    title_id: i64,
    review_id: i64,
) -> Result<(), AppError> {
    reviews
        .get_review(TitleId(title_id), ReviewId(review_id))
        .await?;
    Ok(())
}

/// `GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/`
pub async fn list<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CommentOut>>, AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    check_review(&state.reviews, title_id, review_id).await?;
    let items = state
        .reviews
        .list_comments(ReviewId(review_id), page(params.limit, params.offset))
        .await?;
    Ok(Json(items.into_iter().map(CommentOut::from).collect()))
}

/// `POST /api/v1/titles/{title_id}/reviews/{review_id}/comments/`
/// (any authenticated user)
pub async fn create<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(body): Json<CommentIn>,
) -> Result<(StatusCode, Json<CommentOut>), AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    let actor = policy::create_publication(auth.identity())?;
    check_review(&state.reviews, title_id, review_id).await?;
    validate::text(&body.text)?;
    let comment = state
        .reviews
        .create_comment(&NewComment {
            review_id: ReviewId(review_id),
            author_id: actor.user_id,
            author: actor.username.clone(),
            text: body.text,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// `GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/`
pub async fn retrieve<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> Result<Json<CommentOut>, AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    check_review(&state.reviews, title_id, review_id).await?;
    let comment = state
        .reviews
        .get_comment(ReviewId(review_id), CommentId(comment_id))
        .await?;
    Ok(Json(comment.into()))
}

/// `PATCH .../comments/{comment_id}/` (author, moderator or admin)
pub async fn update<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Json(body): Json<CommentPatchIn>,
) -> Result<Json<CommentOut>, AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    check_review(&state.reviews, title_id, review_id).await?;
    let existing = state
        .reviews
        .get_comment(ReviewId(review_id), CommentId(comment_id))
        .await?;
    policy::modify_publication(auth.identity(), existing.publication.author_id)?;

    let Some(text) = body.text else {
        // Nothing to change.
        return Ok(Json(existing.into()));
    };
    validate::text(&text)?;
    let comment = state
        .reviews
        .update_comment(ReviewId(review_id), CommentId(comment_id), &text)
        .await?;
    Ok(Json(comment.into()))
}

/// `DELETE .../comments/{comment_id}/` (author, moderator or admin)
pub async fn remove<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> Result<StatusCode, AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    check_review(&state.reviews, title_id, review_id).await?;
    let existing = state
        .reviews
        .get_comment(ReviewId(review_id), CommentId(comment_id))
        .await?;
    policy::modify_publication(auth.identity(), existing.publication.author_id)?;
    state
        .reviews
        .delete_comment(ReviewId(review_id), CommentId(comment_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
