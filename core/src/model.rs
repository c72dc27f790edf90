//! Domain entity types.
//!
//! All types are `Clone` and carry no behavior beyond small accessors;
//! mutation rules live in [`crate::policy`] and the repository
//! implementations. Field groups shared between entities (the
//! name/slug pair, the text/author/date triple) are embedded by value,
//! not inherited.

use crate::ids::{CategoryId, CommentId, GenreId, ReviewId, TitleId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role attached to a user account.
///
/// Dispatch on roles goes through explicit capability checks in
/// [`crate::policy`], never through the role value alone at call
/// sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account. Can publish reviews and comments and edit its
    /// own.
    #[default]
    User,
    /// Can edit and delete any review or comment.
    Moderator,
    /// Full control over the catalog and user accounts.
    Admin,
}

impl Role {
    /// Stable string form, as stored and as exposed in the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "moderator" => Some(Self::Moderator),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name. Pattern-restricted, never `"me"`.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Optional first name.
    pub first_name: String,
    /// Optional last name.
    pub last_name: String,
    /// Free-form biography.
    pub bio: String,
    /// Account role. Defaults to [`Role::User`].
    pub role: Role,
    /// Hash of the currently valid confirmation code, if one has been
    /// issued and not yet consumed. The plaintext code is never
    /// stored.
    pub confirmation_code_hash: Option<String>,
    /// When the current confirmation code was issued.
    pub code_issued_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a fresh account with the default role and no pending
    /// confirmation code.
    #[must_use]
    pub fn new(username: String, email: String) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: Role::default(),
            confirmation_code_hash: None,
            code_issued_at: None,
        }
    }
}

/// Name/slug pair shared by categories and genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugRef {
    /// Human-readable unique name.
    pub name: String,
    /// Unique URL-safe identifier. Immutable once referenced by a
    /// title (the API exposes no update operation on catalog
    /// entries).
    pub slug: String,
}

/// Category of reviewable works (e.g. "Films", "Books").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Name and slug.
    #[serde(flatten)]
    pub slug_ref: SlugRef,
}

/// Genre tag for titles (e.g. "Drama", "Sci-Fi").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Unique genre identifier.
    pub id: GenreId,
    /// Name and slug.
    #[serde(flatten)]
    pub slug_ref: SlugRef,
}

/// A reviewable work, with its resolved category, genres and derived
/// rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    /// Unique title identifier.
    pub id: TitleId,
    /// Name of the work.
    pub name: String,
    /// Release year. Never in the future.
    pub year: i32,
    /// Optional description.
    pub description: Option<String>,
    /// Owning category. `None` when unset or after the category was
    /// deleted (deletion nulls the reference, it never cascades).
    pub category: Option<Category>,
    /// Genre tags.
    pub genres: Vec<Genre>,
    /// Derived average of review scores. `None` when the title has no
    /// reviews. Recomputed by the storage layer after every review
    /// mutation; never independently mutable.
    pub rating: Option<f64>,
}

/// Text/author/date triple shared by reviews and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Author's user id.
    pub author_id: UserId,
    /// Author's username (denormalized for API output).
    pub author: String,
    /// Body text.
    pub text: String,
    /// Publication timestamp. Set at creation, immutable.
    pub pub_date: DateTime<Utc>,
}

/// One scored opinion on a title. At most one per (title, author)
/// pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Unique review identifier.
    pub id: ReviewId,
    /// Title this review belongs to. Deleting the title deletes the
    /// review.
    pub title_id: TitleId,
    /// Integer score in `[1, 10]`.
    pub score: i16,
    /// Text, author and date.
    #[serde(flatten)]
    pub publication: Publication,
}

/// Reply to a review. Deleting the review deletes its comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: CommentId,
    /// Review this comment replies to.
    pub review_id: ReviewId,
    /// Text, author and date.
    #[serde(flatten)]
    pub publication: Publication,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
        let user = User::new("alice".to_string(), "alice@example.com".to_string());
        assert_eq!(user.role, Role::User);
        assert!(user.confirmation_code_hash.is_none());
    }
}
