//! Signup and token endpoints.

use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use critique_auth::EmailProvider;
use critique_core::repo::UserRepository;
use serde::{Deserialize, Serialize};

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupIn {
    /// Desired username.
    pub username: String,
    /// Address the confirmation code is sent to.
    pub email: String,
}

/// Signup response body, echoing the accepted pair.
#[derive(Debug, Serialize)]
pub struct SignupOut {
    /// Accepted username.
    pub username: String,
    /// Accepted email.
    pub email: String,
}

/// Token request body.
#[derive(Debug, Deserialize)]
pub struct TokenIn {
    /// Account username.
    pub username: String,
    /// Code received by email.
    pub confirmation_code: String,
}

/// Token response body.
#[derive(Debug, Serialize)]
pub struct TokenOut {
    /// Signed access token.
    pub token: String,
}

/// `POST /api/v1/auth/signup/`
///
/// Anyone may call this; repeating it re-issues the code.
pub async fn signup<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Json(body): Json<SignupIn>,
) -> Result<Json<SignupOut>, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: EmailProvider,
{
    let outcome = state.signup.signup(&body.username, &body.email).await?;
    Ok(Json(SignupOut {
        username: outcome.username,
        email: outcome.email,
    }))
}

/// `POST /api/v1/auth/token/`
///
/// Unknown usernames are 404; a wrong code for a known username is
/// 400.
pub async fn token<C, R, U, E>(
    State(state): State<AppState<C, R, U, E>>,
    Json(body): Json<TokenIn>,
) -> Result<Json<TokenOut>, AppError>
where
    C: Send + Sync,
    R: Send + Sync,
    U: UserRepository,
    E: EmailProvider,
{
    let token = state
        .signup
        .token(&body.username, &body.confirmation_code)
        .await?;
    Ok(Json(TokenOut { token }))
}
