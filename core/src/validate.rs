//! Input validation.
//!
//! Character-level checks, no regex engine. Every function returns
//! `DomainError::Validation` naming the offending field.

use crate::error::{DomainError, Result};
use chrono::{Datelike, Utc};

/// Maximum username length.
pub const USERNAME_MAX: usize = 150;
/// Maximum email length.
pub const EMAIL_MAX: usize = 254;
/// Maximum slug length.
pub const SLUG_MAX: usize = 50;
/// Maximum name length for catalog entries and titles.
pub const NAME_MAX: usize = 256;
/// Lowest accepted review score.
pub const MIN_SCORE: i16 = 1;
/// Highest accepted review score.
pub const MAX_SCORE: i16 = 10;
/// Username reserved for the `/users/me/` endpoint.
pub const RESERVED_USERNAME: &str = "me";

/// Validate a username.
///
/// Allowed characters are word characters plus `.`, `@`, `+` and `-`.
/// The name `"me"` is reserved and always rejected, regardless of the
/// other fields in the request.
///
/// # Errors
///
/// Returns `DomainError::Validation` on an empty, overlong,
/// ill-formed or reserved username.
pub fn username(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DomainError::validation("username", "must not be empty"));
    }
    if value.chars().count() > USERNAME_MAX {
        return Err(DomainError::validation(
            "username",
            format!("must be at most {USERNAME_MAX} characters"),
        ));
    }
    if value == RESERVED_USERNAME {
        return Err(DomainError::validation(
            "username",
            format!("\"{RESERVED_USERNAME}\" is reserved"),
        ));
    }
    let valid = |c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-');
    if !value.chars().all(valid) {
        return Err(DomainError::validation(
            "username",
            "may only contain letters, digits and . @ + - _",
        ));
    }
    Ok(())
}

/// Validate an email address.
///
/// Basic RFC 5322 shape: exactly one `@`, non-empty local and domain
/// parts, a dotted domain, and a restricted character set.
///
/// # Errors
///
/// Returns `DomainError::Validation` when the address is ill-formed.
pub fn email(value: &str) -> Result<()> {
    let err = || DomainError::validation("email", "not a valid email address");

    if value.chars().count() < 3 || value.chars().count() > EMAIL_MAX {
        return Err(err());
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(err());
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(err());
    }
    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');
    if !local.chars().all(valid_local) || !domain.chars().all(valid_domain) {
        return Err(err());
    }
    if domain.split('.').any(str::is_empty) {
        return Err(err());
    }
    Ok(())
}

/// Validate a URL-safe slug.
///
/// # Errors
///
/// Returns `DomainError::Validation` on an empty, overlong or
/// non-URL-safe slug.
pub fn slug(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DomainError::validation("slug", "must not be empty"));
    }
    if value.chars().count() > SLUG_MAX {
        return Err(DomainError::validation(
            "slug",
            format!("must be at most {SLUG_MAX} characters"),
        ));
    }
    let valid = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if !value.chars().all(valid) {
        return Err(DomainError::validation(
            "slug",
            "may only contain ASCII letters, digits, - and _",
        ));
    }
    Ok(())
}

/// Validate a display name for catalog entries and titles.
///
/// # Errors
///
/// Returns `DomainError::Validation` on an empty or overlong name.
pub fn name(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation("name", "must not be empty"));
    }
    if value.chars().count() > NAME_MAX {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {NAME_MAX} characters"),
        ));
    }
    Ok(())
}

/// Validate a release year: must not lie in the future.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a year after the current one.
pub fn year(value: i32) -> Result<()> {
    let now = Utc::now().year();
    if value > now {
        return Err(DomainError::validation(
            "year",
            format!("{value} may not be later than {now}"),
        ));
    }
    Ok(())
}

/// Validate a review score: integer in `[1, 10]` inclusive.
///
/// # Errors
///
/// Returns `DomainError::Validation` when the score is out of range.
pub fn score(value: i16) -> Result<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(DomainError::validation(
            "score",
            format!("must be between {MIN_SCORE} and {MAX_SCORE}"),
        ));
    }
    Ok(())
}

/// Validate review or comment body text.
///
/// # Errors
///
/// Returns `DomainError::Validation` on empty text.
pub fn text(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation("text", "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(username("alice").is_ok());
        assert!(username("a.b@c+d-e_f").is_ok());
        assert!(username("MEME").is_ok());
    }

    #[test]
    fn test_reserved_username_always_rejected() {
        assert!(username("me").is_err());
        // Case-sensitive: only the exact reserved name is blocked.
        assert!(username("Me").is_ok());
    }

    #[test]
    fn test_username_charset_and_length() {
        assert!(username("").is_err());
        assert!(username("has space").is_err());
        assert!(username("semi;colon").is_err());
        assert!(username(&"a".repeat(150)).is_ok());
        assert!(username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn test_length_limits_count_characters_not_bytes() {
        // Two bytes per character in UTF-8.
        assert!(username(&"é".repeat(150)).is_ok());
        assert!(username(&"é".repeat(151)).is_err());
        assert!(name(&"é".repeat(256)).is_ok());
    }

    #[test]
    fn test_emails() {
        assert!(email("user@example.com").is_ok());
        assert!(email("user+tag@sub.example.co.uk").is_ok());
        assert!(email("invalid").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("user@").is_err());
        assert!(email("user@@example.com").is_err());
        assert!(email("user@example..com").is_err());
        assert!(email("a@b").is_err());
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(email(&long).is_err());
    }

    #[test]
    fn test_slugs() {
        assert!(slug("films").is_ok());
        assert!(slug("sci-fi_2").is_ok());
        assert!(slug("").is_err());
        assert!(slug("with space").is_err());
        assert!(slug("ünïcode").is_err());
        assert!(slug(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_year_not_in_future() {
        let now = Utc::now().year();
        assert!(year(now).is_ok());
        assert!(year(1888).is_ok());
        assert!(year(now + 1).is_err());
    }

    #[test]
    fn test_score_range_is_one_to_ten_inclusive() {
        assert!(score(0).is_err());
        assert!(score(1).is_ok());
        assert!(score(10).is_ok());
        assert!(score(11).is_err());
        assert!(score(-1).is_err());
    }
}
