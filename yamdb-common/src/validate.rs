//! Field-level validation rules
//!
//! Every constraint runs before a mutation reaches the repository, and each
//! check reports a human-readable message the caller attaches to the
//! offending field. Out-of-range values are rejected, never clamped.

use chrono::{Datelike, Utc};

/// Maximum username length
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum email length. One legacy revision capped this at 150; the
/// service standardizes on the RFC-adjacent 254.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum first/last name length
pub const MAX_PERSON_NAME_LENGTH: usize = 150;

/// Maximum Category/Genre/Title name length
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum Category/Genre slug length
pub const MAX_SLUG_LENGTH: usize = 50;

/// Inclusive review score bounds
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 10;

/// Default lower bound for Title.year (configurable, see ServiceConfig)
pub const DEFAULT_MIN_YEAR: i64 = 1;

type Check = std::result::Result<(), String>;

/// Username: non-empty, length-capped, charset `[A-Za-z0-9_.@+-]+`,
/// and never the reserved literal "me" in any letter case.
pub fn check_username(value: &str) -> Check {
    if value.is_empty() {
        return Err("This field may not be blank".to_string());
    }
    if value.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters",
            MAX_USERNAME_LENGTH
        ));
    }
    if value.eq_ignore_ascii_case("me") {
        return Err("Username \"me\" is reserved".to_string());
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_.@+-".contains(c))
    {
        return Err("Only letters, digits and _.@+- are allowed".to_string());
    }
    Ok(())
}

/// Email: non-empty, length-capped, minimal syntactic shape
/// (single '@' separating a non-empty local part from a dotted domain).
pub fn check_email(value: &str) -> Check {
    if value.is_empty() {
        return Err("This field may not be blank".to_string());
    }
    if value.chars().count() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters",
            MAX_EMAIL_LENGTH
        ));
    }
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    let domain_ok = !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !domain.contains('@')
        && !domain.contains(char::is_whitespace);
    if local.is_empty() || local.contains(char::is_whitespace) || !domain_ok {
        return Err("Enter a valid email address".to_string());
    }
    Ok(())
}

/// Optional first/last name fields
pub fn check_person_name(value: &str) -> Check {
    if value.chars().count() > MAX_PERSON_NAME_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters",
            MAX_PERSON_NAME_LENGTH
        ));
    }
    Ok(())
}

/// Category/Genre/Title display name
pub fn check_name(value: &str) -> Check {
    if value.is_empty() {
        return Err("This field may not be blank".to_string());
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters",
            MAX_NAME_LENGTH
        ));
    }
    Ok(())
}

/// Slug: non-empty, length-capped, URL-safe charset `[A-Za-z0-9_-]+`
pub fn check_slug(value: &str) -> Check {
    if value.is_empty() {
        return Err("This field may not be blank".to_string());
    }
    if value.chars().count() > MAX_SLUG_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters",
            MAX_SLUG_LENGTH
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Only letters, digits, hyphens and underscores are allowed".to_string());
    }
    Ok(())
}

/// Review score: integer in [0, 10] inclusive
pub fn check_score(value: i64) -> Check {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(format!(
            "Score must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        ));
    }
    Ok(())
}

/// Title year: must not exceed the current calendar year at validation
/// time; the lower bound is a policy knob supplied by configuration.
pub fn check_year(value: i64, min_year: i64) -> Check {
    let current = current_year();
    if value < min_year {
        return Err(format!("Year may not be earlier than {}", min_year));
    }
    if value > current {
        return Err(format!("Year may not be later than {}", current));
    }
    Ok(())
}

/// Current calendar year (UTC)
pub fn current_year() -> i64 {
    Utc::now().year() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_reserved_me_rejected_case_insensitively() {
        assert!(check_username("me").is_err());
        assert!(check_username("Me").is_err());
        assert!(check_username("ME").is_err());
        assert!(check_username("mE").is_err());
        // "me" as a substring is fine
        assert!(check_username("meredith").is_ok());
    }

    #[test]
    fn username_charset_enforced() {
        assert!(check_username("regular.user+tag@host-1_x").is_ok());
        assert!(check_username("with space").is_err());
        assert!(check_username("semi;colon").is_err());
        assert!(check_username("").is_err());
    }

    #[test]
    fn username_length_capped() {
        assert!(check_username(&"a".repeat(MAX_USERNAME_LENGTH)).is_ok());
        assert!(check_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn email_shape_and_length() {
        assert!(check_email("user@example.com").is_ok());
        assert!(check_email("user@localhost").is_err());
        assert!(check_email("not-an-email").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("user@.com").is_err());

        let long_local = "a".repeat(MAX_EMAIL_LENGTH);
        assert!(check_email(&format!("{}@example.com", long_local)).is_err());
    }

    #[test]
    fn score_bounds_inclusive() {
        assert!(check_score(0).is_ok());
        assert!(check_score(10).is_ok());
        assert!(check_score(-1).is_err());
        assert!(check_score(11).is_err());
    }

    #[test]
    fn year_bounds() {
        let current = current_year();
        assert!(check_year(current, DEFAULT_MIN_YEAR).is_ok());
        assert!(check_year(current + 1, DEFAULT_MIN_YEAR).is_err());
        assert!(check_year(0, DEFAULT_MIN_YEAR).is_err());
        // configurable floor
        assert!(check_year(1800, 1900).is_err());
        assert!(check_year(1984, 1900).is_ok());
    }

    #[test]
    fn slug_charset_and_length() {
        assert!(check_slug("sci-fi_2").is_ok());
        assert!(check_slug("with space").is_err());
        assert!(check_slug("naïve").is_err());
        assert!(check_slug(&"s".repeat(MAX_SLUG_LENGTH + 1)).is_err());
    }
}
