//! # Stockroom
//!
//! An inventory-management backend: CRUD and search over products, brands,
//! categories, providers, sales, stocktakings, users, roles and permissions,
//! backed by MongoDB, with stateless HS256 token authentication.
//!
//! ## Design
//!
//! - **Declarative queries**: search parameters become a [`core::query::FilterSpec`]
//!   — a store-agnostic list of predicates with explicit AND-across-fields /
//!   OR-across-terms composition. Only the storage layer knows how predicates
//!   spell in MongoDB's query language.
//! - **Partially-bound ranges**: [`core::range::between`] resolves any
//!   combination of optional lower/upper bounds for date and amount
//!   intervals.
//! - **Stateless credentials**: [`auth::TokenIssuer`] / [`auth::TokenVerifier`]
//!   sign and validate time-bounded tokens; signing-key material is loaded
//!   once at startup and shared read-only, so concurrent requests need no
//!   locking.
//! - **Uniform errors**: every domain failure crosses the HTTP boundary
//!   through [`core::error::translate`] into one body shape.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockroom::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     stockroom::server::run(config, Arc::new(MyPasswordVerifier)).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::Entity,
        error::{ApiError, DomainError, ErrorResponse, translate},
        query::{Combine, FilterSpec, Matcher, Predicate},
        range::{RangeValue, between},
    };

    // === Auth ===
    pub use crate::auth::{
        Identity, PasswordVerifier, TokenIssuer, TokenRejection, TokenVerifier,
    };

    // === Config ===
    pub use crate::config::{AppConfig, AuthConfig};

    // === Entities ===
    pub use crate::entities::{
        Brand, Category, Permission, Product, Provider, Role, Sale, Stocktaking, User,
    };

    // === Storage ===
    pub use crate::storage::MongoStore;

    // === Server ===
    pub use crate::server::AppState;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
