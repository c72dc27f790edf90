//! Title endpoints.

use super::{page, catalog::SlugEntryOut};
use crate::error::AppError;
use crate::extract::MaybeAuth;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use critique_core::TitleId;
use critique_core::model::Title;
use critique_core::repo::{CatalogRepository, NewTitle, TitleFilter, TitlePatch};
use critique_core::{policy, validate};
use serde::{Deserialize, Serialize};

/// Request body for creating a title. Category and genres are passed
/// by slug.
#[derive(Debug, Deserialize)]
pub struct TitleIn {
    /// Name of the work.
    pub name: String,
    /// Release year, not in the future.
    pub year: i32,
    /// Optional description.
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Partial update body. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct TitlePatchIn {
    /// New name.
    pub name: Option<String>,
    /// New release year.
    pub year: Option<i32>,
    /// New description.
    pub description: Option<String>,
    /// New category slug.
    pub category: Option<String>,
    /// Replacement genre slugs.
    pub genre: Option<Vec<String>>,
}

/// Title as exposed by the API, with resolved category, genres and the
/// derived rating.
#[derive(Debug, Serialize)]
pub struct TitleOut {
    /// Title id.
    pub id: i64,
    /// Name of the work.
    pub name: String,
    /// Release year.
    pub year: i32,
    /// Average review score, absent while unreviewed.
    pub rating: Option<f64>,
    /// Description.
    pub description: Option<String>,
    /// Resolved category.
    pub category: Option<SlugEntryOut>,
    /// Resolved genre tags.
    pub genre: Vec<SlugEntryOut>,
}

impl From<Title> for TitleOut {
    fn from(title: Title) -> Self {
        Self {
            id: title.id.0,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            category: title.category.map(SlugEntryOut::from),
            genre: title.genres.into_iter().map(SlugEntryOut::from).collect(),
        }
    }
}

/// Filters accepted by the title listing.
#[derive(Debug, Default, Deserialize)]
pub struct TitleListParams {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
    /// Substring of the name.
    pub name: Option<String>,
    /// Maximum number of items returned.
    pub limit: Option<i64>,
    /// Number of items skipped.
    pub offset: Option<i64>,
}

/// `GET /api/v1/titles/`
pub async fn list<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Query(params): Query<TitleListParams>,
) -> Result<Json<Vec<TitleOut>>, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    let filter = TitleFilter {
        category: params.category,
        genre: params.genre,
        year: params.year,
        name: params.name,
    };
    let items = state
        .catalog
        .list_titles(&filter, page(params.limit, params.offset))
        .await?;
    Ok(Json(items.into_iter().map(TitleOut::from).collect()))
}

/// `POST /api/v1/titles/` (admin)
pub async fn create<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Json(body): Json<TitleIn>,
) -> Result<(StatusCode, Json<TitleOut>), AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    policy::write_catalog(auth.identity())?;
    validate::name(&body.name)?;
    validate::year(body.year)?;
    let title = state
        .catalog
        .create_title(&NewTitle {
            name: body.name,
            year: body.year,
            description: body.description,
            category: body.category,
            genres: body.genre,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(title.into())))
}

/// `GET /api/v1/titles/{id}/`
pub async fn retrieve<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Path(title_id): Path<i64>,
) -> Result<Json<TitleOut>, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    let title = state.catalog.get_title(TitleId(title_id)).await?;
    Ok(Json(title.into()))
}

/// `PATCH /api/v1/titles/{id}/` (admin)
pub async fn update<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(title_id): Path<i64>,
    Json(body): Json<TitlePatchIn>,
) -> Result<Json<TitleOut>, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    policy::write_catalog(auth.identity())?;
    if let Some(name) = &body.name {
        validate::name(name)?;
    }
    if let Some(year) = body.year {
        validate::year(year)?;
    }
    let title = state
        .catalog
        .update_title(
            TitleId(title_id),
            &TitlePatch {
                name: body.name,
                year: body.year,
                description: body.description,
                category: body.category,
                genres: body.genre,
            },
        )
        .await?;
    Ok(Json(title.into()))
}

/// `DELETE /api/v1/titles/{id}/` (admin)
///
/// Takes the title's reviews and their comments with it.
pub async fn remove<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(title_id): Path<i64>,
) -> Result<StatusCode, AppError>
where
    C: CatalogRepository,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    policy::write_catalog(auth.identity())?;
    state.catalog.delete_title(TitleId(title_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
