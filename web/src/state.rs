//! Shared application state.

use critique_auth::{EmailProvider, SignupService, TokenSigner};
use critique_core::repo::{CatalogRepository, ReviewRepository, UserRepository};

/// Application state, generic over the storage backend and the email
/// provider so tests can swap in in-memory implementations.
pub struct AppState<C, R, U, E> {
    /// Catalog storage.
    pub catalog: C,
    /// Review and comment storage.
    pub reviews: R,
    /// User account storage.
    pub users: U,
    /// Signup and token flow.
    pub signup: SignupService<U, E>,
    /// Access token signer, used by the auth extractor.
    pub signer: TokenSigner,
}

impl<C, R, U, E> AppState<C, R, U, E>
where
    C: CatalogRepository + Clone,
    R: ReviewRepository + Clone,
    U: UserRepository + Clone,
    E: EmailProvider + Clone,
{
    /// Assemble the state from its parts.
    pub fn new(
        catalog: C,
        reviews: R,
        users: U,
        email: E,
        signer: TokenSigner,
        code_ttl: chrono::Duration,
    ) -> Self {
        let signup = SignupService::new(users.clone(), email, signer.clone(), code_ttl);
        Self {
            catalog,
            reviews,
            users,
            signup,
            signer,
        }
    }
}

impl<C: Clone, R: Clone, U: Clone, E: Clone> Clone for AppState<C, R, U, E> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            reviews: self.reviews.clone(),
            users: self.users.clone(),
            signup: self.signup.clone(),
            signer: self.signer.clone(),
        }
    }
}
