//! HTTP routes.
//!
//! All endpoints live under `/api/v1`. Collection endpoints accept
//! `limit`/`offset` paging; full replacement (`PUT`) is not offered
//! anywhere, only `PATCH`.

pub mod auth;
pub mod catalog;
pub mod comments;
pub mod reviews;
pub mod titles;
pub mod users;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use critique_auth::EmailProvider;
use critique_core::repo::{CatalogRepository, Page, ReviewRepository, UserRepository};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Paging and search parameters shared by collection endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Substring filter on the collection's name field.
    pub search: Option<String>,
    /// Maximum number of items returned.
    pub limit: Option<i64>,
    /// Number of items skipped.
    pub offset: Option<i64>,
}

/// Largest accepted page size.
const LIMIT_MAX: i64 = 100;

pub(crate) fn page(limit: Option<i64>, offset: Option<i64>) -> Page {
    let default = Page::default();
    Page {
        limit: limit.unwrap_or(default.limit).clamp(1, LIMIT_MAX),
        offset: offset.unwrap_or(default.offset).max(0),
    }
}

/// Build the API router over the given state.
pub fn router<C, R, U, E>(state: AppState<C, R, U, E>) -> Router
where
    C: CatalogRepository + Clone + 'static,
    R: ReviewRepository + Clone + 'static,
    U: UserRepository + Clone + 'static,
    E: EmailProvider + Clone + 'static,
{
    Router::new()
        .route("/api/v1/auth/signup/", post(auth::signup::<C, R, U, E>))
        .route("/api/v1/auth/token/", post(auth::token::<C, R, U, E>))
        .route(
            "/api/v1/categories/",
            get(catalog::list_categories::<C, R, U, E>)
                .post(catalog::create_category::<C, R, U, E>),
        )
        .route(
            "/api/v1/categories/:slug/",
            get(catalog::get_category::<C, R, U, E>)
                .delete(catalog::delete_category::<C, R, U, E>),
        )
        .route(
            "/api/v1/genres/",
            get(catalog::list_genres::<C, R, U, E>).post(catalog::create_genre::<C, R, U, E>),
        )
        .route(
            "/api/v1/genres/:slug/",
            get(catalog::get_genre::<C, R, U, E>).delete(catalog::delete_genre::<C, R, U, E>),
        )
        .route(
            "/api/v1/titles/",
            get(titles::list::<C, R, U, E>).post(titles::create::<C, R, U, E>),
        )
        .route(
            "/api/v1/titles/:title_id/",
            get(titles::retrieve::<C, R, U, E>)
                .patch(titles::update::<C, R, U, E>)
                .delete(titles::remove::<C, R, U, E>),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/",
            get(reviews::list::<C, R, U, E>).post(reviews::create::<C, R, U, E>),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/",
            get(reviews::retrieve::<C, R, U, E>)
                .patch(reviews::update::<C, R, U, E>)
                .delete(reviews::remove::<C, R, U, E>),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/",
            get(comments::list::<C, R, U, E>).post(comments::create::<C, R, U, E>),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/:comment_id/",
            get(comments::retrieve::<C, R, U, E>)
                .patch(comments::update::<C, R, U, E>)
                .delete(comments::remove::<C, R, U, E>),
        )
        .route(
            "/api/v1/users/",
            get(users::list::<C, R, U, E>).post(users::create::<C, R, U, E>),
        )
        .route(
            "/api/v1/users/me/",
            get(users::me::<C, R, U, E>).patch(users::update_me::<C, R, U, E>),
        )
        .route(
            "/api/v1/users/:username/",
            get(users::retrieve::<C, R, U, E>)
                .patch(users::update::<C, R, U, E>)
                .delete(users::remove::<C, R, U, E>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
