//! Permission documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;
use crate::core::query::FilterSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

impl Entity for Permission {
    type Input = PermissionInput;

    fn collection() -> &'static str {
        "permissions"
    }

    fn kind() -> &'static str {
        "Permission"
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

    fn from_input(input: PermissionInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_input(&mut self, input: PermissionInput) {
        self.name = input.name;
        self.description = input.description;
        self.updated_at = Utc::now();
    }
}

impl Permission {
    /// Filter matching any permission whose name contains one of `terms`,
    /// case-insensitively. An empty term set matches nothing.
    pub fn names_filter<I, S>(terms: I) -> FilterSpec
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FilterSpec::any_term("name", terms)
    }
}
