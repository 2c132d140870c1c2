//! Product catalog documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;
use crate::core::query::FilterSpec;

/// A stocked product. Category, brand and provider are denormalized names —
/// the usual document-store trade-off to keep filterable fields local to
/// the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub brand: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound payload for creating or updating a product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub brand: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub provider: String,
}

impl Entity for Product {
    type Input = ProductInput;

    fn collection() -> &'static str {
        "products"
    }

    fn kind() -> &'static str {
        "Product"
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

    fn from_input(input: ProductInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            category: input.category,
            brand: input.brand,
            provider: input.provider,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_input(&mut self, input: ProductInput) {
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.stock = input.stock;
        self.category = input.category;
        self.brand = input.brand;
        self.provider = input.provider;
        self.updated_at = Utc::now();
    }
}

impl Product {
    /// Search filter over optional name/category/brand/provider terms.
    ///
    /// All four are independently combinable; an absent or blank parameter
    /// adds no predicate for its field.
    pub fn search_filter(
        name: Option<&str>,
        category: Option<&str>,
        brand: Option<&str>,
        provider: Option<&str>,
    ) -> FilterSpec {
        FilterSpec::contains_all([
            ("name", name),
            ("category", category),
            ("brand", brand),
            ("provider", provider),
        ])
    }
}
