//! Role documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;

/// A role grouping permission names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Entity for Role {
    type Input = RoleInput;

    fn collection() -> &'static str {
        "roles"
    }

    fn kind() -> &'static str {
        "Role"
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

    fn from_input(input: RoleInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            permissions: input.permissions,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_input(&mut self, input: RoleInput) {
        self.name = input.name;
        self.description = input.description;
        self.permissions = input.permissions;
        self.updated_at = Utc::now();
    }
}
