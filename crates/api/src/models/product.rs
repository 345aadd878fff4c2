//! Product catalog model and filter types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shoplink_core::{Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub stock: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated product ready for insertion.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub stock: i32,
    pub image: Option<String>,
}

/// A validated partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
}

/// Listing filters parsed from query parameters.
///
/// Numeric filters are parsed leniently: a malformed value is dropped
/// rather than turned into a request error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_stock: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    /// Build a filter from raw query-string values.
    #[must_use]
    pub fn from_raw(
        name: Option<String>,
        category: Option<String>,
        stock: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
    ) -> Self {
        Self {
            name: name.filter(|s| !s.trim().is_empty()),
            category: category.filter(|s| !s.trim().is_empty()),
            min_stock: stock.and_then(|s| s.trim().parse::<i32>().ok()),
            min_price: parse_decimal(min_price),
            max_price: parse_decimal(max_price),
        }
    }
}

fn parse_decimal(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parses_valid_numbers() {
        let filter = ProductFilter::from_raw(
            Some("teclado".to_owned()),
            Some("perifericos".to_owned()),
            Some("3"),
            Some("10.50"),
            Some("99"),
        );
        assert_eq!(filter.min_stock, Some(3));
        assert_eq!(filter.min_price, Some(Decimal::new(1050, 2)));
        assert_eq!(filter.max_price, Some(Decimal::new(99, 0)));
    }

    #[test]
    fn test_filter_ignores_malformed_numbers() {
        let filter = ProductFilter::from_raw(None, None, Some("many"), Some("abc"), Some("--"));
        assert_eq!(filter.min_stock, None);
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, None);
    }

    #[test]
    fn test_filter_drops_blank_strings() {
        let filter = ProductFilter::from_raw(Some("  ".to_owned()), Some(String::new()), None, None, None);
        assert_eq!(filter, ProductFilter::default());
    }
}
