//! Stocktaking documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;
use crate::core::query::FilterSpec;
use crate::core::range::between;

/// A physical count of one product's stock, compared against the expected
/// book quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stocktaking {
    pub id: Uuid,
    pub product_id: Uuid,
    pub expected: i64,
    pub counted: i64,
    pub taken_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StocktakingInput {
    pub product_id: Uuid,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub expected: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub counted: i64,
    /// Defaults to now when omitted.
    pub taken_at: Option<DateTime<Utc>>,
}

impl Entity for Stocktaking {
    type Input = StocktakingInput;

    fn collection() -> &'static str {
        "stocktakings"
    }

    fn kind() -> &'static str {
        "Stocktaking"
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

    fn from_input(input: StocktakingInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id: input.product_id,
            expected: input.expected,
            counted: input.counted,
            taken_at: input.taken_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_input(&mut self, input: StocktakingInput) {
        self.product_id = input.product_id;
        self.expected = input.expected;
        self.counted = input.counted;
        if let Some(taken_at) = input.taken_at {
            self.taken_at = taken_at;
        }
        self.updated_at = Utc::now();
    }
}

impl Stocktaking {
    /// Counted minus expected; negative means shrinkage.
    pub fn discrepancy(&self) -> i64 {
        self.counted - self.expected
    }

    /// Search filter over an optional taken-at interval.
    pub fn search_filter(
        taken_after: Option<DateTime<Utc>>,
        taken_before: Option<DateTime<Utc>>,
    ) -> FilterSpec {
        between("taken_at", taken_after, taken_before)
    }
}
