//! Declarative query predicates and the dynamic filter builder
//!
//! Search endpoints accept a handful of optional parameters and must turn
//! whatever subset the caller supplied into one store query. [`FilterSpec`]
//! is the declarative description of that query: groups of field predicates,
//! each group combining with [`Combine::All`] (across different fields) or
//! [`Combine::Any`] (across candidate terms on one field). The two strategies
//! are explicit and never inferred — conflating them silently changes result
//! semantics.
//!
//! A spec is built per incoming request, handed to the storage layer for
//! interpretation, and dropped. It is never persisted.
//!
//! # Example
//! ```rust,ignore
//! // GET /products/search?category=elec
//! let spec = FilterSpec::contains_all([
//!     ("name", None),
//!     ("category", Some("elec")),
//! ]);
//! // One case-insensitive-contains predicate on "category"; no predicate
//! // at all on "name".
//! ```

use serde::Serialize;
use serde_json::Value;

/// How a single field is matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Matcher {
    /// Exact value equality.
    Equals(Value),

    /// Case-insensitive substring match.
    Contains(String),

    /// Case-insensitive regular expression match.
    Regex(String),

    /// Inclusive lower bound (`field >= value`).
    AtLeast(Value),

    /// Inclusive upper bound (`field <= value`).
    AtMost(Value),
}

/// A single named predicate over a document field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub field: String,
    pub matcher: Matcher,
}

impl Predicate {
    pub fn new(field: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            field: field.into(),
            matcher,
        }
    }

    /// Case-insensitive-contains predicate.
    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(field, Matcher::Contains(term.into()))
    }

    /// Exact-equality predicate.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Matcher::Equals(value.into()))
    }
}

/// How the predicates within one group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Combine {
    /// Every predicate must hold (AND) — used across different fields.
    All,

    /// At least one predicate must hold (OR) — used across candidate terms
    /// against a single field.
    Any,
}

/// One group of predicates sharing a combination strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateGroup {
    pub combine: Combine,
    pub predicates: Vec<Predicate>,
}

/// Declarative description of one collection query.
///
/// Groups combine with AND. A spec with no groups is *unconstrained* (the
/// caller asked for everything); a *match-nothing* spec matches no document
/// at all. The two are deliberately distinct states: an empty OR-term set
/// must yield an empty result set, not an accidental full-collection scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSpec {
    groups: Vec<PredicateGroup>,
    match_nothing: bool,
}

impl FilterSpec {
    /// A spec with no predicate at all — matches every document.
    pub fn unconstrained() -> Self {
        Self {
            groups: Vec::new(),
            match_nothing: false,
        }
    }

    /// A spec that matches no document.
    pub fn match_nothing() -> Self {
        Self {
            groups: Vec::new(),
            match_nothing: true,
        }
    }

    /// AND-group over the given predicates. An empty list yields an
    /// unconstrained spec.
    pub fn all_of(predicates: Vec<Predicate>) -> Self {
        if predicates.is_empty() {
            return Self::unconstrained();
        }
        Self {
            groups: vec![PredicateGroup {
                combine: Combine::All,
                predicates,
            }],
            match_nothing: false,
        }
    }

    /// One case-insensitive-contains predicate per non-empty value,
    /// AND-combined across fields.
    ///
    /// Absent or blank values add no predicate for their field — absence
    /// narrows nothing, it is not a wildcard. Supplying only `None`s yields
    /// an unconstrained spec.
    pub fn contains_all<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let predicates = fields
            .into_iter()
            .filter_map(|(field, value)| match value {
                Some(term) if !term.trim().is_empty() => Some(Predicate::contains(field, term)),
                _ => None,
            })
            .collect();

        Self::all_of(predicates)
    }

    /// OR across candidate terms against a single field, one
    /// case-insensitive-contains predicate per term.
    ///
    /// An empty term set yields a match-nothing spec — an empty input must
    /// produce an empty result set, never "match all".
    pub fn any_term<I, S>(field: &str, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let predicates: Vec<Predicate> = terms
            .into_iter()
            .filter(|term| !term.as_ref().trim().is_empty())
            .map(|term| Predicate::contains(field, term.as_ref()))
            .collect();

        if predicates.is_empty() {
            return Self::match_nothing();
        }
        Self {
            groups: vec![PredicateGroup {
                combine: Combine::Any,
                predicates,
            }],
            match_nothing: false,
        }
    }

    /// OR of exact-equality predicates over the supplied `(field, value)`
    /// pairs, skipping absent values. No pair supplied at all yields a
    /// match-nothing spec.
    pub fn equals_any<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let predicates: Vec<Predicate> = pairs
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| Predicate::equals(field, v)))
            .collect();

        if predicates.is_empty() {
            return Self::match_nothing();
        }
        Self {
            groups: vec![PredicateGroup {
                combine: Combine::Any,
                predicates,
            }],
            match_nothing: false,
        }
    }

    /// AND-merge with another spec. Match-nothing is absorbing: if either
    /// side matches nothing, so does the result.
    pub fn and(mut self, other: Self) -> Self {
        if self.match_nothing || other.match_nothing {
            return Self::match_nothing();
        }
        self.groups.extend(other.groups);
        self
    }

    pub fn matches_nothing(&self) -> bool {
        self.match_nothing
    }

    pub fn is_unconstrained(&self) -> bool {
        !self.match_nothing && self.groups.is_empty()
    }

    pub fn groups(&self) -> &[PredicateGroup] {
        &self.groups
    }

    /// Total number of predicates across all groups.
    pub fn predicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.predicates.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_all_skips_absent_fields() {
        let spec = FilterSpec::contains_all([
            ("name", None),
            ("category", Some("elec")),
            ("brand", None),
            ("provider", Some("acme")),
        ]);

        assert_eq!(spec.predicate_count(), 2);
        let group = &spec.groups()[0];
        assert_eq!(group.combine, Combine::All);
        assert_eq!(group.predicates[0], Predicate::contains("category", "elec"));
        assert_eq!(group.predicates[1], Predicate::contains("provider", "acme"));
    }

    #[test]
    fn test_contains_all_skips_blank_values() {
        let spec = FilterSpec::contains_all([("name", Some("")), ("brand", Some("   "))]);
        assert!(spec.is_unconstrained());
    }

    #[test]
    fn test_contains_all_all_absent_is_unconstrained() {
        let spec = FilterSpec::contains_all([("name", None), ("category", None)]);
        assert!(spec.is_unconstrained());
        assert!(!spec.matches_nothing());
    }

    #[test]
    fn test_any_term_builds_or_group() {
        let spec = FilterSpec::any_term("name", ["admin", "manager"]);

        assert_eq!(spec.groups().len(), 1);
        let group = &spec.groups()[0];
        assert_eq!(group.combine, Combine::Any);
        assert_eq!(group.predicates.len(), 2);
        assert_eq!(group.predicates[0], Predicate::contains("name", "admin"));
    }

    #[test]
    fn test_any_term_empty_set_matches_nothing() {
        let spec = FilterSpec::any_term("name", Vec::<String>::new());
        assert!(spec.matches_nothing());
        assert!(!spec.is_unconstrained());
    }

    #[test]
    fn test_any_term_blank_terms_match_nothing() {
        let spec = FilterSpec::any_term("name", ["", "  "]);
        assert!(spec.matches_nothing());
    }

    #[test]
    fn test_equals_any_skips_absent_pairs() {
        let spec = FilterSpec::equals_any([("username", Some("alice")), ("email", None)]);

        let group = &spec.groups()[0];
        assert_eq!(group.combine, Combine::Any);
        assert_eq!(group.predicates.len(), 1);
        assert_eq!(group.predicates[0], Predicate::equals("username", "alice"));
    }

    #[test]
    fn test_equals_any_no_pairs_matches_nothing() {
        let spec = FilterSpec::equals_any([("username", None), ("email", None)]);
        assert!(spec.matches_nothing());
    }

    #[test]
    fn test_and_concatenates_groups() {
        let a = FilterSpec::contains_all([("name", Some("bolt"))]);
        let b = FilterSpec::any_term("tag", ["steel"]);
        let merged = a.and(b);

        assert_eq!(merged.groups().len(), 2);
        assert_eq!(merged.groups()[0].combine, Combine::All);
        assert_eq!(merged.groups()[1].combine, Combine::Any);
    }

    #[test]
    fn test_and_match_nothing_is_absorbing() {
        let a = FilterSpec::contains_all([("name", Some("bolt"))]);
        let merged = a.and(FilterSpec::match_nothing());
        assert!(merged.matches_nothing());

        let b = FilterSpec::match_nothing().and(FilterSpec::unconstrained());
        assert!(b.matches_nothing());
    }

    #[test]
    fn test_and_with_unconstrained_is_identity() {
        let a = FilterSpec::contains_all([("name", Some("bolt"))]);
        let merged = a.clone().and(FilterSpec::unconstrained());
        assert_eq!(merged, a);
    }
}
