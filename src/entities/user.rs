//! User account documents

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;
use crate::core::query::FilterSpec;

/// A user account. `password_hash` is produced by an external hashing step;
/// this service never sees or stores a cleartext password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password_hash: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Entity for User {
    type Input = UserInput;

    fn collection() -> &'static str {
        "users"
    }

    fn kind() -> &'static str {
        "User"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_input(input: UserInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            roles: input.roles,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_input(&mut self, input: UserInput) {
        self.username = input.username;
        self.email = input.email;
        self.password_hash = input.password_hash;
        self.roles = input.roles;
        self.updated_at = Utc::now();
    }
}

impl User {
    /// Lookup filter matching either identifier exactly, OR-combined.
    ///
    /// Each supplied identifier becomes an explicit equals predicate; with
    /// neither supplied the filter matches nothing rather than degrading to
    /// a field-exists scan over the whole collection.
    pub fn identifier_filter(username: Option<&str>, email: Option<&str>) -> FilterSpec {
        FilterSpec::equals_any([("username", username), ("email", email)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{Combine, Matcher};
    use serde_json::Value;

    #[test]
    fn test_identifier_filter_binds_values() {
        let spec = User::identifier_filter(Some("alice"), Some("alice@example.com"));

        let group = &spec.groups()[0];
        assert_eq!(group.combine, Combine::Any);
        assert_eq!(group.predicates.len(), 2);
        assert_eq!(
            group.predicates[0].matcher,
            Matcher::Equals(Value::from("alice"))
        );
        assert_eq!(
            group.predicates[1].matcher,
            Matcher::Equals(Value::from("alice@example.com"))
        );
    }

    #[test]
    fn test_identifier_filter_username_only() {
        let spec = User::identifier_filter(Some("alice"), None);
        assert_eq!(spec.predicate_count(), 1);
        assert_eq!(spec.groups()[0].predicates[0].field, "username");
    }

    #[test]
    fn test_identifier_filter_neither_matches_nothing() {
        let spec = User::identifier_filter(None, None);
        assert!(spec.matches_nothing());
    }
}
