//! User administration endpoints and the `/users/me/` profile.

use super::{ListParams, page};
use crate::error::AppError;
use crate::extract::MaybeAuth;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use critique_core::model::{Role, User};
use critique_core::repo::UserRepository;
use critique_core::{DomainError, policy, validate};
use serde::{Deserialize, Serialize};

/// Request body for creating a user (admin only).
#[derive(Debug, Deserialize)]
pub struct UserIn {
    /// Unique username.
    pub username: String,
    /// Unique email.
    pub email: String,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Biography.
    #[serde(default)]
    pub bio: String,
    /// Role, defaults to `user`.
    #[serde(default)]
    pub role: Role,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize)]
pub struct UserPatchIn {
    /// New username.
    pub username: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New role. Ignored on `/users/me/` for non-admins.
    pub role: Option<Role>,
}

/// User account as exposed by the API.
#[derive(Debug, Serialize)]
pub struct UserOut {
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Biography.
    pub bio: String,
    /// Role.
    pub role: Role,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

fn apply_patch(user: &mut User, patch: UserPatchIn, allow_role: bool) -> Result<(), DomainError> {
    if let Some(username) = patch.username {
        validate::username(&username)?;
        user.username = username;
    }
    if let Some(email) = patch.email {
        validate::email(&email)?;
        user.email = email;
    }
    if let Some(first_name) = patch.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        user.last_name = last_name;
    }
    if let Some(bio) = patch.bio {
        user.bio = bio;
    }
    if allow_role {
        if let Some(role) = patch.role {
            user.role = role;
        }
    }
    Ok(())
}

/// `GET /api/v1/users/` (admin)
pub async fn list<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserOut>>, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: Send + Sync,
{
    policy::manage_users(auth.identity())?;
    let items = state
        .users
        .list_users(params.search.as_deref(), page(params.limit, params.offset))
        .await?;
    Ok(Json(items.into_iter().map(UserOut::from).collect()))
}

/// `POST /api/v1/users/` (admin)
pub async fn create<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Json(body): Json<UserIn>,
) -> Result<(StatusCode, Json<UserOut>), AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: Send + Sync,
{
    policy::manage_users(auth.identity())?;
    validate::username(&body.username)?;
    validate::email(&body.email)?;

    let mut user = User::new(body.username, body.email);
    user.first_name = body.first_name;
    user.last_name = body.last_name;
    user.bio = body.bio;
    user.role = body.role;

    let user = state.users.create_user(&user).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /api/v1/users/me/` (any authenticated user)
pub async fn me<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
) -> Result<Json<UserOut>, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: Send + Sync,
{
    let actor = policy::authenticated(auth.identity())?;
    let user = state
        .users
        .find_by_username(&actor.username)
        .await?
        .ok_or(DomainError::not_found("user"))?;
    Ok(Json(user.into()))
}

/// `PATCH /api/v1/users/me/` (any authenticated user)
///
/// A non-admin cannot raise their own role; the field is silently
/// ignored rather than rejected.
pub async fn update_me<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Json(body): Json<UserPatchIn>,
) -> Result<Json<UserOut>, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: Send + Sync,
{
    let actor = policy::authenticated(auth.identity())?;
    let mut user = state
        .users
        .find_by_username(&actor.username)
        .await?
        .ok_or(DomainError::not_found("user"))?;
    apply_patch(&mut user, body, actor.is_admin())?;
    let user = state.users.update_user(&user).await?;
    Ok(Json(user.into()))
}

/// `GET /api/v1/users/{username}/` (admin)
pub async fn retrieve<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(username): Path<String>,
) -> Result<Json<UserOut>, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: Send + Sync,
{
    policy::manage_users(auth.identity())?;
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(DomainError::not_found("user"))?;
    Ok(Json(user.into()))
}

/// `PATCH /api/v1/users/{username}/` (admin)
pub async fn update<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(username): Path<String>,
    Json(body): Json<UserPatchIn>,
) -> Result<Json<UserOut>, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: Send + Sync,
{
    policy::manage_users(auth.identity())?;
    let mut user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(DomainError::not_found("user"))?;
    apply_patch(&mut user, body, true)?;
    let user = state.users.update_user(&user).await?;
    Ok(Json(user.into()))
}

/// `DELETE /api/v1/users/{username}/` (admin)
pub async fn remove<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    auth: MaybeAuth,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: Send + Sync,
{
    policy::manage_users(auth.identity())?;
    state.users.delete_user(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}
