//! Optional two-sided range resolution for ordered fields
//!
//! Sales are filtered by date interval and by total interval; either bound
//! of either interval may be absent. [`between`] resolves every bound
//! combination into the right predicate set:
//!
//! | lower   | upper   | predicates                          |
//! |---------|---------|-------------------------------------|
//! | present | present | `field >= lower` AND `field <= upper` |
//! | present | absent  | `field >= lower`                    |
//! | absent  | present | `field <= upper`                    |
//! | absent  | absent  | none — the field is unconstrained   |
//!
//! Bounds are inclusive. The resolver is generic over field name and value
//! type and never assumes a specific entity. Whether `lower <= upper`
//! actually holds is the caller's validation concern; the resolver stays
//! total.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::core::query::{FilterSpec, Matcher, Predicate};

/// An ordered value a range bound may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeValue {
    /// A point in time.
    Timestamp(DateTime<Utc>),

    /// A decimal amount, e.g. a sale total.
    Amount(f64),
}

impl From<DateTime<Utc>> for RangeValue {
    fn from(value: DateTime<Utc>) -> Self {
        RangeValue::Timestamp(value)
    }
}

impl From<f64> for RangeValue {
    fn from(value: f64) -> Self {
        RangeValue::Amount(value)
    }
}

impl RangeValue {
    /// Render the bound in the store's wire representation.
    ///
    /// Timestamps become RFC 3339 UTC strings — the same rendering serde
    /// gives stored datetimes, so lexicographic comparison in the store
    /// stays chronological.
    fn into_value(self) -> Value {
        match self {
            RangeValue::Timestamp(ts) => {
                Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            RangeValue::Amount(amount) => Value::from(amount),
        }
    }
}

/// Constrain `field` to an optional inclusive interval.
///
/// Emits one predicate per present bound; with neither bound present the
/// returned spec is unconstrained (no predicate on the field at all, as
/// opposed to an explicit "match all").
pub fn between<T>(field: &str, lower: Option<T>, upper: Option<T>) -> FilterSpec
where
    T: Into<RangeValue>,
{
    let mut predicates = Vec::new();

    if let Some(lo) = lower {
        predicates.push(Predicate::new(
            field,
            Matcher::AtLeast(lo.into().into_value()),
        ));
    }
    if let Some(hi) = upper {
        predicates.push(Predicate::new(field, Matcher::AtMost(hi.into().into_value())));
    }

    FilterSpec::all_of(predicates)
}
