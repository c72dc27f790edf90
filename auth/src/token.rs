//! Signed access tokens.
//!
//! Tokens are JWTs (HS256) carrying the user's id, username and role.
//! The web layer verifies the token on every request and builds an
//! [`Identity`] from the claims; no session state is kept server-side.

use chrono::{Duration, Utc};
use critique_core::model::{Role, User};
use critique_core::{DomainError, Identity, Result, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: uuid::Uuid,
    /// Username at issue time.
    pub username: String,
    /// Role at issue time.
    pub role: Role,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
}

/// Issues and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a signer from a shared secret and a token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for the given user.
    ///
    /// # Errors
    ///
    /// `Internal` when signing fails.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.0,
            username: user.username.clone(),
            role: user.role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("token signing failed: {e}")))
    }

    /// Verify a token and extract the caller's identity.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for an expired, malformed or forged token.
    pub fn verify(&self, token: &str) -> Result<Identity> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| DomainError::Unauthenticated)?;
        Ok(Identity {
            user_id: UserId(data.claims.sub),
            username: data.claims.username,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret", Duration::hours(1))
    }

    fn user(role: Role) -> User {
        let mut u = User::new("alice".to_string(), "alice@example.com".to_string());
        u.role = role;
        u
    }

    #[test]
    fn test_round_trip_preserves_identity() {
        let signer = signer();
        let user = user(Role::Moderator);

        let token = signer.issue(&user).unwrap();
        let identity = signer.verify(&token).unwrap();

        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::Moderator);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = signer().issue(&user(Role::User)).unwrap();
        let other = TokenSigner::new(b"other-secret", Duration::hours(1));
        assert_eq!(other.verify(&token), Err(DomainError::Unauthenticated));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let stale = TokenSigner::new(b"test-secret", Duration::hours(-2));
        let token = stale.issue(&user(Role::User)).unwrap();
        assert_eq!(signer().verify(&token), Err(DomainError::Unauthenticated));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(
            signer().verify("not-a-token"),
            Err(DomainError::Unauthenticated)
        );
    }
}
