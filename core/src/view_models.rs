//! View models exchanged at the HTTP boundary.
//!
//! These are plain data shapes. [`SaveCar`] carries only the fields a client
//! may supply; [`CarView`] is what clients get back, including the
//! server-assigned identifier.

use crate::model::CarId;
use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_COUNT: u32 = 3;

/// Largest page a client may request.
pub const MAX_PAGE_COUNT: u32 = 20;

/// Payload for creating or replacing a car.
///
/// There is deliberately no identifier field: a `carId` in the request body
/// is ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCar {
    /// Number of engine cylinders
    #[serde(default)]
    pub cylinders: Option<u8>,
    /// Manufacturer
    pub make: String,
    /// Model name
    pub model: String,
}

impl SaveCar {
    /// Create a payload without a cylinder count.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            cylinders: None,
            make: make.into(),
            model: model.into(),
        }
    }
}

/// A car as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarView {
    /// Server-assigned identifier
    pub car_id: CarId,
    /// Number of engine cylinders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinders: Option<u8>,
    /// Manufacturer
    pub make: String,
    /// Model name
    pub model: String,
}

/// Paging parameters from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_count() -> u32 {
    DEFAULT_PAGE_COUNT
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page: default_page(),
            count: default_count(),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub count: u32,
    /// Number of items across all pages
    pub total_count: u64,
    /// Number of pages
    pub total_pages: u64,
    /// Items on this page
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page, deriving the page total from `total_count` and `count`.
    #[must_use]
    pub fn new(options: PageOptions, total_count: u64, items: Vec<T>) -> Self {
        Self {
            page: options.page,
            count: options.count,
            total_count,
            total_pages: total_pages(total_count, options.count),
            items,
        }
    }
}

/// Number of pages needed to hold `total_count` items.
#[must_use]
pub fn total_pages(total_count: u64, count: u32) -> u64 {
    if count == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(count))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn save_car_ignores_client_supplied_id() {
        let save_car: SaveCar =
            serde_json::from_str(r#"{ "carId": 7, "make": "Toyota", "model": "Corolla" }"#)
                .unwrap();

        assert_eq!(save_car, SaveCar::new("Toyota", "Corolla"));
    }

    #[test]
    fn car_view_serializes_camel_case_without_missing_cylinders() {
        let view = CarView {
            car_id: CarId::new(42),
            cylinders: None,
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "carId": 42, "make": "Toyota", "model": "Corolla" })
        );
    }

    #[test]
    fn page_options_defaults() {
        let options: PageOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, PageOptions { page: 1, count: 3 });
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 3), 0);
        assert_eq!(total_pages(3, 3), 1);
        assert_eq!(total_pages(4, 3), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    proptest::proptest! {
        #[test]
        fn pages_hold_every_item_with_no_empty_page(total in 0u64..10_000, count in 1..=MAX_PAGE_COUNT) {
            let pages = total_pages(total, count);
            let count = u64::from(count);

            proptest::prop_assert!(pages * count >= total);
            proptest::prop_assert!(pages == 0 || (pages - 1) * count < total);
        }
    }
}
