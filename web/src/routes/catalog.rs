//! Category and genre endpoints.
//!
//! Both collections behave identically: open listing, admin-only
//! create and delete, no update (a slug is immutable once referenced).

use super::{ListParams, page};
use crate::error::AppError;
use crate::extract::MaybeAuth;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use critique_core::model::{Category, Genre, SlugRef};
use critique_core::repo::{CatalogRepository, NewSlugEntry};
use critique_core::{policy, validate};
use serde::{Deserialize, Serialize};

/// Request body for creating a category or genre.
#[derive(Debug, Deserialize)]
pub struct SlugEntryIn {
    /// Unique display name.
    pub name: String,
    /// Unique URL-safe slug.
    pub slug: String,
}

/// Category or genre as exposed by the API.
#[derive(Debug, Serialize)]
pub struct SlugEntryOut {
    /// Display name.
    pub name: String,
    /// URL-safe slug.
    pub slug: String,
}

impl From<SlugRef> for SlugEntryOut {
    fn from(slug_ref: SlugRef) -> Self {
        Self {
            name: slug_ref.name,
            slug: slug_ref.slug,
        }
    }
}

impl From<Category> for SlugEntryOut {
    fn from(category: Category) -> Self {
        category.slug_ref.into()
    }
}

impl From<Genre> for SlugEntryOut {
    fn from(genre: Genre) -> Self {
        genre.slug_ref.into()
    }
}

fn validated(body: SlugEntryIn) -> Result<NewSlugEntry, AppError> {
    validate::name(&body.name)?;
    validate::slug(&body.slug)?;
    Ok(NewSlugEntry {
        name: body.name,
        slug: body.slug,
    })
}

/// `GET /api/v1/categories/`
pub async fn list_categories<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SlugEntryOut>>, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    let items = state
        .catalog
        .list_categories(params.search.as_deref(), page(params.limit, params.offset))
        .await?;
    Ok(Json(items.into_iter().map(SlugEntryOut::from).collect()))
}

/// `POST /api/v1/categories/` (admin)
pub async fn create_category<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Json(body): Json<SlugEntryIn>,
) -> Result<(StatusCode, Json<SlugEntryOut>), AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    policy::write_catalog(auth.identity())?;
    let entry = validated(body)?;
    let category = state.catalog.create_category(&entry).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// `GET /api/v1/categories/{slug}/`
pub async fn get_category<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Path(slug): Path<String>,
) -> Result<Json<SlugEntryOut>, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    let category = state.catalog.get_category(&slug).await?;
    Ok(Json(category.into()))
}

/// `DELETE /api/v1/categories/{slug}/` (admin)
///
/// Titles in the category survive, uncategorized.
pub async fn delete_category<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    policy::write_catalog(auth.identity())?;
    state.catalog.delete_category(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/genres/`
pub async fn list_genres<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SlugEntryOut>>, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    let items = state
        .catalog
        .list_genres(params.search.as_deref(), page(params.limit, params.offset))
        .await?;
    Ok(Json(items.into_iter().map(SlugEntryOut::from).collect()))
}

/// `POST /api/v1/genres/` (admin)
pub async fn create_genre<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Json(body): Json<SlugEntryIn>,
) -> Result<(StatusCode, Json<SlugEntryOut>), AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    policy::write_catalog(auth.identity())?;
    let entry = validated(body)?;
    let genre = state.catalog.create_genre(&entry).await?;
    Ok((StatusCode::CREATED, Json(genre.into())))
}

/// `GET /api/v1/genres/{slug}/`
pub async fn get_genre<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Path(slug): Path<String>,
) -> Result<Json<SlugEntryOut>, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    let genre = state.catalog.get_genre(&slug).await?;
    Ok(Json(genre.into()))
}

/// `DELETE /api/v1/genres/{slug}/` (admin)
pub async fn delete_genre<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    policy::write_catalog(auth.identity())?;
    state.catalog.delete_genre(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
