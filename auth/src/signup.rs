//! Signup and token issuance flow.

use crate::email::EmailProvider;
use crate::token::TokenSigner;
use crate::code;
use chrono::{Duration, Utc};
use critique_core::model::User;
use critique_core::repo::UserRepository;
use critique_core::{validate, DomainError, Result};
use tracing::{info, warn};

/// What the signup endpoint echoes back on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    /// Username the code was issued for.
    pub username: String,
    /// Address the code was sent to.
    pub email: String,
}

/// Orchestrates the two-step login flow over a user store, an email
/// provider and a token signer.
#[derive(Clone)]
pub struct SignupService<U, E> {
    users: U,
    email: E,
    signer: TokenSigner,
    code_ttl: Duration,
}

impl<U, E> SignupService<U, E>
where
    U: UserRepository,
    E: EmailProvider,
{
    /// Create the service.
    pub fn new(users: U, email: E, signer: TokenSigner, code_ttl: Duration) -> Self {
        Self {
            users,
            email,
            signer,
            code_ttl,
        }
    }

    /// Register an account (or revisit an existing one) and email a
    /// fresh confirmation code.
    ///
    /// Posting the same username/email pair again is not an error: the
    /// previous code is replaced and a new one is sent, so a lost
    /// email never locks the account out.
    ///
    /// The code hash is persisted before the email goes out. If
    /// delivery then fails the error is returned but the code stays
    /// valid, and the client can simply retry.
    ///
    /// # Errors
    ///
    /// `Validation` for an ill-formed or reserved username or email,
    /// `Conflict` when the username or email belongs to a different
    /// account, `Delivery` when the email cannot be sent.
    pub async fn signup(&self, username: &str, email: &str) -> Result<SignupOutcome> {
        validate::username(username)?;
        validate::email(email)?;

        let by_username = self.users.find_by_username(username).await?;
        let by_email = self.users.find_by_email(email).await?;

        let user = match (by_username, by_email) {
            (Some(u), Some(v)) if u.id == v.id => u,
            (Some(_), _) => {
                return Err(DomainError::Conflict(
                    "username is registered with a different email".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(DomainError::Conflict(
                    "email is registered with a different username".to_string(),
                ));
            }
            (None, None) => {
                let user = User::new(username.to_string(), email.to_string());
                self.users.create_user(&user).await?
            }
        };

        let plain = code::generate();
        self.users
            .set_confirmation_code(user.id, &code::hash(&plain), Utc::now())
            .await?;

        if let Err(e) = self
            .email
            .send_confirmation_code(&user.email, &user.username, &plain)
            .await
        {
            // The stored code stays valid; a retry will re-issue anyway.
            warn!(username = %user.username, error = %e, "confirmation code delivery failed");
            return Err(e);
        }

        info!(username = %user.username, "confirmation code issued");
        Ok(SignupOutcome {
            username: user.username,
            email: user.email,
        })
    }

    /// Exchange a username and confirmation code for an access token.
    ///
    /// The code is single-use: it is cleared before the token is
    /// returned.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown username, `InvalidConfirmationCode`
    /// when the code is wrong, expired or was already used.
    pub async fn token(&self, username: &str, confirmation_code: &str) -> Result<String> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(DomainError::not_found("user"))?;

        let Some(stored_hash) = &user.confirmation_code_hash else {
            return Err(DomainError::InvalidConfirmationCode);
        };
        if let Some(issued_at) = user.code_issued_at {
            if Utc::now() - issued_at > self.code_ttl {
                return Err(DomainError::InvalidConfirmationCode);
            }
        }
        if !code::verify(confirmation_code, stored_hash) {
            return Err(DomainError::InvalidConfirmationCode);
        }

        // Sign first: if issuing fails the code must stay usable for a
        // retry.
        let token = self.signer.issue(&user)?;
        self.users.clear_confirmation_code(user.id).await?;
        info!(username = %user.username, "access token issued");
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::RecordingEmailProvider;
    use chrono::DateTime;
    use critique_core::UserId;
    use critique_core::mocks::MemoryStore;
    use critique_core::repo::Page;

    /// Store whose code-clearing step always fails, for exercising a
    /// storage outage in the middle of the token exchange.
    #[derive(Clone)]
    struct UnreliableStore {
        inner: MemoryStore,
    }

    impl UserRepository for UnreliableStore {
        async fn list_users(&self, search: Option<&str>, page: Page) -> Result<Vec<User>> {
            self.inner.list_users(search, page).await
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
            self.inner.find_by_username(username).await
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
            self.inner.find_by_email(email).await
        }

        async fn create_user(&self, user: &User) -> Result<User> {
            self.inner.create_user(user).await
        }

        async fn update_user(&self, user: &User) -> Result<User> {
            self.inner.update_user(user).await
        }

        async fn delete_user(&self, username: &str) -> Result<()> {
            self.inner.delete_user(username).await
        }

        async fn set_confirmation_code(
            &self,
            id: UserId,
            code_hash: &str,
            issued_at: DateTime<Utc>,
        ) -> Result<()> {
            self.inner.set_confirmation_code(id, code_hash, issued_at).await
        }

        async fn clear_confirmation_code(&self, _id: UserId) -> Result<()> {
            Err(DomainError::Database("simulated outage".to_string()))
        }
    }

    fn service(
        store: MemoryStore,
        email: RecordingEmailProvider,
    ) -> SignupService<MemoryStore, RecordingEmailProvider> {
        let signer = TokenSigner::new(b"test-secret", Duration::hours(1));
        SignupService::new(store, email, signer, Duration::days(1))
    }

    #[tokio::test]
    async fn test_signup_then_token() {
        let store = MemoryStore::new();
        let email = RecordingEmailProvider::new();
        let svc = service(store, email.clone());

        let outcome = svc.signup("alice", "alice@example.com").await.unwrap();
        assert_eq!(outcome.username, "alice");

        let code = email.last_code().unwrap();
        let token = svc.token("alice", &code).await.unwrap();
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_codes_are_single_use() {
        let store = MemoryStore::new();
        let email = RecordingEmailProvider::new();
        let svc = service(store, email.clone());

        svc.signup("alice", "alice@example.com").await.unwrap();
        let code = email.last_code().unwrap();

        svc.token("alice", &code).await.unwrap();
        assert_eq!(
            svc.token("alice", &code).await,
            Err(DomainError::InvalidConfirmationCode)
        );
    }

    #[tokio::test]
    async fn test_repeat_signup_reissues_the_code() {
        let store = MemoryStore::new();
        let email = RecordingEmailProvider::new();
        let svc = service(store, email.clone());

        svc.signup("alice", "alice@example.com").await.unwrap();
        let first = email.last_code().unwrap();
        svc.signup("alice", "alice@example.com").await.unwrap();
        let second = email.last_code().unwrap();

        // Only the latest hash is stored.
        if first != second {
            assert_eq!(
                svc.token("alice", &first).await,
                Err(DomainError::InvalidConfirmationCode)
            );
        }
        svc.token("alice", &second).await.unwrap();
    }

    #[tokio::test]
    async fn test_mismatched_pairs_conflict() {
        let store = MemoryStore::new();
        let email = RecordingEmailProvider::new();
        let svc = service(store, email);

        svc.signup("alice", "alice@example.com").await.unwrap();
        assert!(matches!(
            svc.signup("alice", "other@example.com").await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            svc.signup("bob", "alice@example.com").await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_reserved_username_rejected() {
        let store = MemoryStore::new();
        let svc = service(store, RecordingEmailProvider::new());
        assert!(matches!(
            svc.signup("me", "me@example.com").await,
            Err(DomainError::Validation { field: "username", .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_username_is_not_found() {
        let store = MemoryStore::new();
        let svc = service(store, RecordingEmailProvider::new());
        assert_eq!(
            svc.token("ghost", "123456").await,
            Err(DomainError::not_found("user"))
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_the_code() {
        let store = MemoryStore::new();
        let email = RecordingEmailProvider::new();
        let svc = service(store.clone(), email.clone());

        email.set_fail(true);
        assert!(matches!(
            svc.signup("alice", "alice@example.com").await,
            Err(DomainError::Delivery(_))
        ));

        // The account and its pending code survived the outage.
        let user = store.find_by_username("alice").await.unwrap().unwrap();
        assert!(user.confirmation_code_hash.is_some());
    }

    #[tokio::test]
    async fn test_failed_exchange_does_not_consume_the_code() {
        let inner = MemoryStore::new();
        let email = RecordingEmailProvider::new();
        let signer = TokenSigner::new(b"test-secret", Duration::hours(1));
        let svc = SignupService::new(
            UnreliableStore {
                inner: inner.clone(),
            },
            email.clone(),
            signer,
            Duration::days(1),
        );

        svc.signup("alice", "alice@example.com").await.unwrap();
        let code = email.last_code().unwrap();
        assert!(matches!(
            svc.token("alice", &code).await,
            Err(DomainError::Database(_))
        ));

        // The stored code survives and a later retry can still use it.
        let user = inner.find_by_username("alice").await.unwrap().unwrap();
        assert!(user.confirmation_code_hash.is_some());
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let store = MemoryStore::new();
        let email = RecordingEmailProvider::new();
        let signer = TokenSigner::new(b"test-secret", Duration::hours(1));
        let svc = SignupService::new(store, email.clone(), signer, Duration::seconds(-1));

        svc.signup("alice", "alice@example.com").await.unwrap();
        let code = email.last_code().unwrap();
        assert_eq!(
            svc.token("alice", &code).await,
            Err(DomainError::InvalidConfirmationCode)
        );
    }
}
