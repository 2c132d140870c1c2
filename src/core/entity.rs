//! Entity trait implemented by every stored document type

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

/// A domain document persisted in its own collection.
///
/// Every entity owns a collection named after its plural resource
/// (`"products"`, `"sales"`, ...) and a `kind` used in not-found errors
/// (`"Product"`, `"Sale"`, ...). Inbound create/update payloads are a
/// separate [`Entity::Input`] type so callers can never set ids or
/// timestamps directly.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Validated create/update payload for this entity.
    type Input: DeserializeOwned + Validate + Send + 'static;

    /// Collection name (plural).
    fn collection() -> &'static str;

    /// Kind label used in error messages (singular, capitalized).
    fn kind() -> &'static str;

    /// Unique identifier of this document.
    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Build a fresh document from an inbound payload. Assigns a new id and
    /// sets both timestamps to now.
    fn from_input(input: Self::Input) -> Self;

    /// Overwrite the mutable fields from an inbound payload, bumping
    /// `updated_at`. Id and `created_at` are preserved.
    fn apply_input(&mut self, input: Self::Input);
}
