//! Category documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

impl Entity for Category {
    type Input = CategoryInput;

    fn collection() -> &'static str {
        "categories"
    }

    fn kind() -> &'static str {
        "Category"
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

    fn from_input(input: CategoryInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_input(&mut self, input: CategoryInput) {
        self.name = input.name;
        self.description = input.description;
        self.updated_at = Utc::now();
    }
}
