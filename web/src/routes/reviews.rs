//! Review endpoints, nested under a title.

use super::{ListParams, page};
use crate::error::AppError;
use crate::extract::MaybeAuth;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use critique_core::model::Review;
use critique_core::repo::{CatalogRepository, NewReview, ReviewPatch, ReviewRepository};
use critique_core::{ReviewId, TitleId, policy, validate};
use serde::{Deserialize, Serialize};

/// Request body for creating a review.
#[derive(Debug, Deserialize)]
pub struct ReviewIn {
    /// Review text.
    pub text: String,
    /// Score in `[1, 10]`.
    pub score: i16,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewPatchIn {
    /// New text.
    pub text: Option<String>,
    /// New score.
    pub score: Option<i16>,
}

/// Review as exposed by the API.
#[derive(Debug, Serialize)]
pub struct ReviewOut {
    /// Review id.
    pub id: i64,
    /// Review text.
    pub text: String,
    /// Author's username.
    pub author: String,
    /// Score in `[1, 10]`.
    pub score: i16,
    /// Publication timestamp.
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewOut {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.0,
            text: review.publication.text,
            author: review.publication.author,
            score: review.score,
            pub_date: review.publication.pub_date,
        }
    }
}

/// `GET /api/v1/titles/{title_id}/reviews/`
pub async fn list<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Path(title_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReviewOut>>, AppError>
where
    C: CatalogRepository,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    // 404 for an unknown title rather than an empty list.
    state.catalog.get_title(TitleId(title_id)).await?;
    let items = state
        .reviews
        .list_reviews(TitleId(title_id), page(params.limit, params.offset))
        .await?;
    Ok(Json(items.into_iter().map(ReviewOut::from).collect()))
}

/// `POST /api/v1/titles/{title_id}/reviews/` (any authenticated user)
///
/// A second review of the same title by the same author is a conflict.
pub async fn create<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(title_id): Path<i64>,
    Json(body): Json<ReviewIn>,
) -> Result<(StatusCode, Json<ReviewOut>), AppError>
where
    C: CatalogRepository,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    let actor = policy::create_publication(auth.identity())?;
    validate::text(&body.text)?;
    validate::score(body.score)?;
    let review = state
        .reviews
        .create_review(&NewReview {
            title_id: TitleId(title_id),
            author_id: actor.user_id,
            author: actor.username.clone(),
            text: body.text,
            score: body.score,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

/// `GET /api/v1/titles/{title_id}/reviews/{review_id}/`
pub async fn retrieve<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> Result<Json<ReviewOut>, AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    let review = state
        .reviews
        .get_review(TitleId(title_id), ReviewId(review_id))
        .await?;
    Ok(Json(review.into()))
}

/// `PATCH /api/v1/titles/{title_id}/reviews/{review_id}/`
/// (author, moderator or admin)
pub async fn update<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(body): Json<ReviewPatchIn>,
) -> Result<Json<ReviewOut>, AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    let existing = state
        .reviews
        .get_review(TitleId(title_id), ReviewId(review_id))
        .await?;
    policy::modify_publication(auth.identity(), existing.publication.author_id)?;
    if let Some(text) = &body.text {
        validate::text(text)?;
    }
    if let Some(score) = body.score {
        validate::score(score)?;
    }
    let review = state
        .reviews
        .update_review(
            TitleId(title_id),
            ReviewId(review_id),
            &ReviewPatch {
                text: body.text,
                score: body.score,
            },
        )
        .await?;
    Ok(Json(review.into()))
}

/// `DELETE /api/v1/titles/{title_id}/reviews/{review_id}/`
/// (author, moderator or admin)
pub async fn remove<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError>
where
    C: Send + Sync,
    R: ReviewRepository,
    U: Send + Sync,
    E: Send + Sync,
{
    let existing = state
        .reviews
        .get_review(TitleId(title_id), ReviewId(review_id))
        .await?;
    policy::modify_publication(auth.identity(), existing.publication.author_id)?;
    state
        .reviews
        .delete_review(TitleId(title_id), ReviewId(review_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
