//! # Row Mapping
//!
//! Conversions between nullable SQL columns and domain records.
//!
//! ## Null Conventions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Domain value                     Column value                          │
//! │  ───────────────────────────────  ────────────────────────────────      │
//! │  observations == ""          ──►  NULL                                  │
//! │  observations == "fragile"   ──►  'fragile'                             │
//! │  NULL                        ──►  observations == ""                    │
//! │                                                                         │
//! │  updated_at == None          ──►  NULL                                  │
//! │  updated_at == Some(epoch)   ──►  NULL   (zero value)                   │
//! │  updated_at == Some(t)       ──►  t                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An empty observation and a missing one are therefore the same thing
//! once stored.

use billing_core::Product;
use chrono::{DateTime, Utc};

/// Maps an empty string to NULL.
#[inline]
pub fn string_to_null(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Maps NULL back to an empty string.
#[inline]
pub fn null_to_string(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Maps a missing or zero-valued (Unix epoch) timestamp to NULL.
#[inline]
pub fn time_to_null(t: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    t.filter(|t| *t != DateTime::<Utc>::default())
}

/// A `products` row, columns in select order.
///
/// Both dialects select
/// `id, name, observation, price, created_at, updated_at`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub observation: Option<String>,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            observations: null_to_string(row.observation),
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_string_to_null() {
        assert_eq!(string_to_null(""), None);
        assert_eq!(string_to_null("fragile"), Some("fragile"));
        // Whitespace is a value
        assert_eq!(string_to_null(" "), Some(" "));
    }

    #[test]
    fn test_null_to_string() {
        assert_eq!(null_to_string(None), "");
        assert_eq!(null_to_string(Some("x".to_string())), "x");
    }

    #[test]
    fn test_empty_observation_collapses_to_empty() {
        let stored = string_to_null("").map(str::to_string);
        assert_eq!(null_to_string(stored), "");
    }

    #[test]
    fn test_time_to_null() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        assert_eq!(time_to_null(None), None);
        assert_eq!(time_to_null(Some(DateTime::<Utc>::default())), None);
        assert_eq!(time_to_null(Some(t)), Some(t));
    }

    #[test]
    fn test_product_row_into_product() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let row = ProductRow {
            id: 7,
            name: "Tea".to_string(),
            observation: None,
            price: 120,
            created_at: created,
            updated_at: None,
        };

        let product = Product::from(row);
        assert_eq!(product.id, 7);
        assert_eq!(product.name, "Tea");
        assert_eq!(product.observations, "");
        assert_eq!(product.price, 120);
        assert_eq!(product.created_at, created);
        assert_eq!(product.updated_at, None);
    }
}
