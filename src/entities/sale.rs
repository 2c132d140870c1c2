//! Sale documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;
use crate::core::query::FilterSpec;
use crate::core::range::between;

/// A completed sale. `sold_at` and `total` are the two range-searchable
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub customer: String,
    pub total: f64,
    pub sold_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaleInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub customer: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total: f64,
    /// Defaults to now when omitted.
    pub sold_at: Option<DateTime<Utc>>,
}

impl Entity for Sale {
    type Input = SaleInput;

    fn collection() -> &'static str {
        "sales"
    }

    fn kind() -> &'static str {
        "Sale"
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

    fn from_input(input: SaleInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer: input.customer,
            total: input.total,
            sold_at: input.sold_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_input(&mut self, input: SaleInput) {
        let now = Utc::now();
        self.customer = input.customer;
        self.total = input.total;
        if let Some(sold_at) = input.sold_at {
            self.sold_at = sold_at;
        }
        self.updated_at = now;
    }
}

impl Sale {
    /// Search filter combining an optional date interval with an optional
    /// total interval. Any subset of the four bounds may be supplied; an
    /// absent bound constrains nothing.
    pub fn search_filter(
        sold_after: Option<DateTime<Utc>>,
        sold_before: Option<DateTime<Utc>>,
        min_total: Option<f64>,
        max_total: Option<f64>,
    ) -> FilterSpec {
        between("sold_at", sold_after, sold_before).and(between("total", min_total, max_total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::Matcher;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_search_filter_all_bounds() {
        let spec = Sale::search_filter(
            Some(date(2024, 1, 1)),
            Some(date(2024, 1, 31)),
            Some(10.0),
            Some(250.0),
        );

        assert_eq!(spec.predicate_count(), 4);
    }

    #[test]
    fn test_search_filter_date_only() {
        let spec = Sale::search_filter(Some(date(2024, 1, 1)), None, None, None);

        assert_eq!(spec.predicate_count(), 1);
        let predicate = &spec.groups()[0].predicates[0];
        assert_eq!(predicate.field, "sold_at");
        assert!(matches!(predicate.matcher, Matcher::AtLeast(_)));
    }

    #[test]
    fn test_search_filter_total_only() {
        let spec = Sale::search_filter(None, None, None, Some(99.99));

        assert_eq!(spec.predicate_count(), 1);
        let predicate = &spec.groups()[0].predicates[0];
        assert_eq!(predicate.field, "total");
        assert!(matches!(predicate.matcher, Matcher::AtMost(_)));
    }

    #[test]
    fn test_search_filter_no_bounds_is_unconstrained() {
        let spec = Sale::search_filter(None, None, None, None);
        assert!(spec.is_unconstrained());
    }
}
