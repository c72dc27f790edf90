//! Custom Axum extractors.

use crate::error::AppError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use critique_core::Identity;

/// Optional bearer-token authentication.
///
/// Absent header means an anonymous caller: reads are open, so this is
/// not an error. A header that is present but malformed, expired or
/// forged rejects the request with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<Identity>);

impl MaybeAuth {
    /// The identity, if the caller authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<C, R, U, E> FromRequestParts<AppState<C, R, U, E>> for MaybeAuth
where
    C: Send + Sync,
    R: Send + Sync,
    U: Send + Sync,
    E: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C, R, U, E>,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };
        let value = header
            .to_str()
            .map_err(|_| AppError::unauthorized("malformed authorization header"))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("expected a bearer token"))?;
        let identity = state.signer.verify(token)?;
        Ok(Self(Some(identity)))
    }
}
