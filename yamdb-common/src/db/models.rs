//! Database models
//!
//! Plain row shapes shared between the repository queries and the API
//! serializers. Fields that are internal keys are skipped on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role, stored as lowercase text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub guid: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    #[serde(skip_serializing)]
    pub is_staff: bool,
    #[serde(skip_serializing)]
    pub is_superuser: bool,
}

/// Named slugged tag; Category and Genre share this shape
#[derive(Debug, Clone, Serialize)]
pub struct Term {
    #[serde(skip_serializing)]
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A reviewable work as served by the API. `rating` is derived on read
/// from review scores and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub year: i64,
    pub rating: Option<i64>,
    pub description: Option<String>,
    pub genre: Vec<Term>,
    pub category: Option<Term>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i64,
    pub text: String,
    /// Author's username; the owning user reference is immutable
    #[serde(rename = "author")]
    pub author_username: String,
    #[serde(skip_serializing)]
    pub author_guid: String,
    pub score: i64,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    #[serde(rename = "author")]
    pub author_username: String,
    #[serde(skip_serializing)]
    pub author_guid: String,
    pub pub_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn internal_keys_not_serialized() {
        let review = Review {
            id: 1,
            text: "fine".to_string(),
            author_username: "reader".to_string(),
            author_guid: "guid-1".to_string(),
            score: 7,
            pub_date: Utc::now(),
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["author"], "reader");
        assert!(json.get("author_guid").is_none());
    }
}
