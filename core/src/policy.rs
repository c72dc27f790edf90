//! Role-based access policy.
//!
//! One explicit capability-check function per operation kind. Every
//! check takes the authenticated [`Identity`] (or its absence) as an
//! argument; there is no ambient request state. Checks have no side
//! effects: a denial leaves nothing behind.
//!
//! Reads are open to anyone and need no check.

use crate::error::{DomainError, Result};
use crate::ids::UserId;
use crate::model::Role;

/// Authenticated caller context, decoded from the access token and
/// passed explicitly into every handler and policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The caller's user id.
    pub user_id: UserId,
    /// The caller's username.
    pub username: String,
    /// The caller's role.
    pub role: Role,
}

impl Identity {
    /// `true` for administrators.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// `true` for moderators.
    #[must_use]
    pub const fn is_moderator(&self) -> bool {
        matches!(self.role, Role::Moderator)
    }
}

/// Require an authenticated caller.
///
/// # Errors
///
/// `Unauthenticated` when no identity is present.
pub fn authenticated(actor: Option<&Identity>) -> Result<&Identity> {
    actor.ok_or(DomainError::Unauthenticated)
}

/// Write or delete catalog entities (categories, genres, titles).
/// Requires `Admin`.
///
/// # Errors
///
/// `Unauthenticated` without an identity, `PermissionDenied` for
/// non-admins.
pub fn write_catalog(actor: Option<&Identity>) -> Result<()> {
    let actor = authenticated(actor)?;
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::PermissionDenied)
    }
}

/// Create a review or comment. Requires any authenticated user.
///
/// # Errors
///
/// `Unauthenticated` without an identity.
pub fn create_publication(actor: Option<&Identity>) -> Result<&Identity> {
    authenticated(actor)
}

/// Update or delete a review or comment. Allowed for the resource's
/// author, moderators and admins.
///
/// # Errors
///
/// `Unauthenticated` without an identity, `PermissionDenied` when the
/// caller is neither the author nor privileged.
pub fn modify_publication(actor: Option<&Identity>, author_id: UserId) -> Result<()> {
    let actor = authenticated(actor)?;
    if actor.is_admin() || actor.is_moderator() || actor.user_id == author_id {
        Ok(())
    } else {
        Err(DomainError::PermissionDenied)
    }
}

/// Manage user accounts (list, create, read, update, delete by
/// username). Requires `Admin`.
///
/// # Errors
///
/// `Unauthenticated` without an identity, `PermissionDenied` for
/// non-admins.
pub fn manage_users(actor: Option<&Identity>) -> Result<()> {
    let actor = authenticated(actor)?;
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: UserId::new(),
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_catalog_writes_require_admin() {
        assert_eq!(write_catalog(None), Err(DomainError::Unauthenticated));
        assert_eq!(
            write_catalog(Some(&identity(Role::User))),
            Err(DomainError::PermissionDenied)
        );
        assert_eq!(
            write_catalog(Some(&identity(Role::Moderator))),
            Err(DomainError::PermissionDenied)
        );
        assert!(write_catalog(Some(&identity(Role::Admin))).is_ok());
    }

    #[test]
    fn test_any_authenticated_user_may_publish() {
        assert!(create_publication(None).is_err());
        assert!(create_publication(Some(&identity(Role::User))).is_ok());
    }

    #[test]
    fn test_author_moderator_and_admin_may_modify() {
        let author = identity(Role::User);
        let stranger = identity(Role::User);

        assert_eq!(
            modify_publication(None, author.user_id),
            Err(DomainError::Unauthenticated)
        );
        assert!(modify_publication(Some(&author), author.user_id).is_ok());
        assert_eq!(
            modify_publication(Some(&stranger), author.user_id),
            Err(DomainError::PermissionDenied)
        );
        assert!(modify_publication(Some(&identity(Role::Moderator)), author.user_id).is_ok());
        assert!(modify_publication(Some(&identity(Role::Admin)), author.user_id).is_ok());
    }

    #[test]
    fn test_user_management_requires_admin() {
        assert!(manage_users(Some(&identity(Role::Admin))).is_ok());
        assert_eq!(
            manage_users(Some(&identity(Role::Moderator))),
            Err(DomainError::PermissionDenied)
        );
        assert_eq!(manage_users(None), Err(DomainError::Unauthenticated));
    }
}
