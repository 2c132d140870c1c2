//! MongoDB storage backend using the official async driver
//!
//! Each entity type gets its own collection, named by
//! [`Entity::collection`]. Entities are serialized via `serde_json::Value`
//! as an intermediate format, then converted to BSON documents. This keeps
//! the handling of UUIDs (stored as strings) and datetimes (stored as ISO
//! 8601 strings) consistent with the rest of the serde pipeline. The `id`
//! field is mapped to MongoDB's `_id` convention.
//!
//! [`compile`] is the single interpreter of [`FilterSpec`]: query
//! construction stays declarative and store-agnostic in `core::query`, and
//! only this module knows how predicates spell in MongoDB's query language.

use std::marker::PhantomData;

use anyhow::{Result, anyhow};
use futures::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Bson, Document, doc};
use uuid::Uuid;

use crate::core::entity::Entity;
use crate::core::query::{Combine, FilterSpec, Matcher, PredicateGroup};

// ---------------------------------------------------------------------------
// FilterSpec compilation
// ---------------------------------------------------------------------------

/// A filter no document satisfies: every stored document has an `_id`.
fn nothing() -> Document {
    doc! { "_id": { "$exists": false } }
}

/// Compile a declarative filter into a MongoDB query document.
pub fn compile(spec: &FilterSpec) -> Result<Document> {
    if spec.matches_nothing() {
        return Ok(nothing());
    }

    let mut compiled: Vec<Document> = spec
        .groups()
        .iter()
        .map(compile_group)
        .collect::<Result<_>>()?;

    Ok(if compiled.is_empty() {
        Document::new()
    } else if compiled.len() == 1 {
        compiled.remove(0)
    } else {
        doc! { "$and": compiled }
    })
}

fn compile_group(group: &PredicateGroup) -> Result<Document> {
    match group.combine {
        Combine::All => {
            // Conditions on the same field merge into one operator document,
            // so a two-sided range becomes {field: {"$gte": a, "$lte": b}}.
            let mut by_field = Document::new();
            for predicate in &group.predicates {
                let cond = condition(&predicate.matcher)?;
                match by_field.get_mut(&predicate.field) {
                    Some(Bson::Document(existing)) => existing.extend(cond),
                    _ => {
                        by_field.insert(predicate.field.clone(), cond);
                    }
                }
            }
            Ok(by_field)
        }
        Combine::Any => {
            if group.predicates.is_empty() {
                return Ok(nothing());
            }
            let branches: Vec<Document> = group
                .predicates
                .iter()
                .map(|p| condition(&p.matcher).map(|cond| doc! { p.field.clone(): cond }))
                .collect::<Result<_>>()?;
            Ok(doc! { "$or": branches })
        }
    }
}

fn condition(matcher: &Matcher) -> Result<Document> {
    Ok(match matcher {
        Matcher::Equals(value) => doc! { "$eq": to_bson(value)? },
        Matcher::Contains(term) => doc! { "$regex": regex::escape(term), "$options": "i" },
        Matcher::Regex(pattern) => doc! { "$regex": pattern.clone(), "$options": "i" },
        Matcher::AtLeast(value) => doc! { "$gte": to_bson(value)? },
        Matcher::AtMost(value) => doc! { "$lte": to_bson(value)? },
    })
}

fn to_bson(value: &serde_json::Value) -> Result<Bson> {
    mongodb::bson::to_bson(value).map_err(|e| anyhow!("Failed to convert value to BSON: {}", e))
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON
/// document, renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: serde_json::Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut document = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = document.remove("id") {
        document.insert("_id", id);
    }

    Ok(document)
}

/// Convert a BSON document back into a serde_json::Value, renaming
/// `_id` → `id` for the domain convention.
fn document_to_json(mut document: Document) -> serde_json::Value {
    if let Some(id) = document.remove("_id") {
        document.insert("id", id);
    }

    Bson::Document(document).into_relaxed_extjson()
}

fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

// ---------------------------------------------------------------------------
// MongoStore<T>
// ---------------------------------------------------------------------------

/// Generic document storage backed by MongoDB.
///
/// The store is the query-execution boundary: filter construction happens
/// in `core::query` / `core::range`, and [`MongoStore::find`] executes a
/// compiled spec against the entity's collection.
#[derive(Clone, Debug)]
pub struct MongoStore<T> {
    database: Database,
    _marker: PhantomData<T>,
}

impl<T> MongoStore<T> {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            _marker: PhantomData,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl<T: Entity> MongoStore<T> {
    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::collection())
    }

    fn to_document(entity: &T) -> Result<Document> {
        let json = serde_json::to_value(entity)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", T::kind(), e))?;
        json_to_document(json)
    }

    fn to_entity(document: Document) -> Result<T> {
        let json = document_to_json(document);
        serde_json::from_value(json)
            .map_err(|e| anyhow!("Failed to deserialize {} from document: {}", T::kind(), e))
    }

    /// Insert a new document and read it back as stored.
    pub async fn insert(&self, entity: T) -> Result<T> {
        let document = Self::to_document(&entity)?;
        let id_bson = uuid_bson(&entity.id());

        self.collection()
            .insert_one(document)
            .await
            .map_err(|e| anyhow!("Failed to create {}: {}", T::kind(), e))?;

        let stored = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back created {}: {}", T::kind(), e))?
            .ok_or_else(|| anyhow!("{} not found after insert", T::kind()))?;

        Self::to_entity(stored)
    }

    /// Fetch a document by id. `Ok(None)` when absent.
    pub async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let document = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get {}: {}", T::kind(), e))?;

        match document {
            Some(d) => Ok(Some(Self::to_entity(d)?)),
            None => Ok(None),
        }
    }

    /// List every document, newest first.
    pub async fn list(&self) -> Result<Vec<T>> {
        self.find(&FilterSpec::unconstrained()).await
    }

    /// Execute a compiled filter, newest first.
    pub async fn find(&self, spec: &FilterSpec) -> Result<Vec<T>> {
        let filter = compile(spec)?;

        let cursor = self
            .collection()
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| anyhow!("Failed to query {}: {}", T::collection(), e))?;

        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect {}: {}", T::collection(), e))?;

        documents.into_iter().map(Self::to_entity).collect()
    }

    /// Replace an existing document. `Err` when it does not exist.
    pub async fn replace(&self, id: &Uuid, entity: T) -> Result<T> {
        let document = Self::to_document(&entity)?;
        let id_bson = uuid_bson(id);

        let result = self
            .collection()
            .replace_one(doc! { "_id": &id_bson }, document)
            .await
            .map_err(|e| anyhow!("Failed to update {}: {}", T::kind(), e))?;

        if result.matched_count == 0 {
            return Err(anyhow!("{} not found: {}", T::kind(), id));
        }

        let updated = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back updated {}: {}", T::kind(), e))?
            .ok_or_else(|| anyhow!("{} not found after update", T::kind()))?;

        Self::to_entity(updated)
    }

    /// Delete a document by id. Idempotent.
    pub async fn delete(&self, id: &Uuid) -> Result<()> {
        self.collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete {}: {}", T::kind(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::Predicate;
    use crate::core::range::between;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // compile
    // -----------------------------------------------------------------------

    #[test]
    fn compile_unconstrained_is_empty_document() {
        let filter = compile(&FilterSpec::unconstrained()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn compile_match_nothing_excludes_every_document() {
        let filter = compile(&FilterSpec::match_nothing()).unwrap();
        assert_eq!(filter, doc! { "_id": { "$exists": false } });
    }

    #[test]
    fn compile_contains_is_case_insensitive_regex() {
        let spec = FilterSpec::contains_all([("category", Some("elec"))]);
        let filter = compile(&spec).unwrap();

        assert_eq!(
            filter,
            doc! { "category": { "$regex": "elec", "$options": "i" } }
        );
    }

    #[test]
    fn compile_contains_escapes_regex_metacharacters() {
        let spec = FilterSpec::contains_all([("name", Some("a.c+"))]);
        let filter = compile(&spec).unwrap();

        let condition = filter.get_document("name").unwrap();
        assert_eq!(condition.get_str("$regex").unwrap(), "a\\.c\\+");
    }

    #[test]
    fn compile_multiple_fields_share_one_document() {
        let spec = FilterSpec::contains_all([("category", Some("elec")), ("brand", Some("acme"))]);
        let filter = compile(&spec).unwrap();

        assert!(filter.get_document("category").is_ok());
        assert!(filter.get_document("brand").is_ok());
        assert!(filter.get("$and").is_none());
    }

    #[test]
    fn compile_two_sided_range_merges_per_field() {
        let spec = between("total", Some(10.0), Some(250.0));
        let filter = compile(&spec).unwrap();

        let condition = filter.get_document("total").unwrap();
        assert_eq!(condition.get_f64("$gte").unwrap(), 10.0);
        assert_eq!(condition.get_f64("$lte").unwrap(), 250.0);
    }

    #[test]
    fn compile_lower_bound_only() {
        let spec = between("total", Some(10.0), None);
        let filter = compile(&spec).unwrap();

        let condition = filter.get_document("total").unwrap();
        assert_eq!(condition.get_f64("$gte").unwrap(), 10.0);
        assert!(condition.get("$lte").is_none());
    }

    #[test]
    fn compile_any_term_becomes_or() {
        let spec = FilterSpec::any_term("name", ["admin", "manager"]);
        let filter = compile(&spec).unwrap();

        let branches = filter.get_array("$or").unwrap();
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn compile_equals_uses_eq_operator() {
        let spec = FilterSpec::equals_any([("username", Some("alice")), ("email", None)]);
        let filter = compile(&spec).unwrap();

        let branches = filter.get_array("$or").unwrap();
        assert_eq!(branches.len(), 1);
        let branch = branches[0].as_document().unwrap();
        assert_eq!(
            branch.get_document("username").unwrap(),
            &doc! { "$eq": "alice" }
        );
    }

    #[test]
    fn compile_merged_specs_use_and() {
        let spec = FilterSpec::contains_all([("customer", Some("smith"))])
            .and(FilterSpec::any_term("tag", ["vip"]));
        let filter = compile(&spec).unwrap();

        let clauses = filter.get_array("$and").unwrap();
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn compile_raw_regex_passes_through_unescaped() {
        let spec = FilterSpec::all_of(vec![Predicate::new(
            "name",
            Matcher::Regex("^bo.t$".to_string()),
        )]);
        let filter = compile(&spec).unwrap();

        let condition = filter.get_document("name").unwrap();
        assert_eq!(condition.get_str("$regex").unwrap(), "^bo.t$");
    }

    // -----------------------------------------------------------------------
    // conversion helpers
    // -----------------------------------------------------------------------

    #[test]
    fn json_to_document_renames_id() {
        let document = json_to_document(json!({"id": "abc", "name": "bolt"})).unwrap();

        assert_eq!(document.get_str("_id").unwrap(), "abc");
        assert!(!document.contains_key("id"));
    }

    #[test]
    fn json_to_document_non_object_is_error() {
        assert!(json_to_document(json!("just a string")).is_err());
    }

    #[test]
    fn document_json_roundtrip() {
        let original = json!({"id": "round", "name": "trip", "stock": 7});
        let document = json_to_document(original).unwrap();
        let back = document_to_json(document);

        assert_eq!(back["id"], "round");
        assert_eq!(back["name"], "trip");
        assert_eq!(back["stock"], 7);
        assert!(back.get("_id").is_none());
    }

    #[test]
    fn uuid_bson_is_string() {
        let id = Uuid::new_v4();
        assert_eq!(uuid_bson(&id), Bson::String(id.to_string()));
    }
}
