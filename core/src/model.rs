//! Domain model.
//!
//! [`Car`] is the internal representation that the repository persists. It is
//! never serialized to clients directly; the web layer maps it to a
//! [`crate::view_models::CarView`] first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persisted car.
///
/// Only the repository assigns identifiers. `CarId::UNASSIGNED` marks a model
/// that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(u64);

impl CarId {
    /// Identifier of a model that has not been persisted.
    pub const UNASSIGNED: Self = Self(0);

    /// Create a car ID from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether the repository has assigned this identifier.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CarId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A car as stored by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Car {
    /// Server-assigned identifier
    pub car_id: CarId,
    /// Number of engine cylinders, if known
    pub cylinders: Option<u8>,
    /// Manufacturer
    pub make: String,
    /// Model name
    pub model: String,
    /// When the car was first stored
    pub created: DateTime<Utc>,
    /// When the car was last written
    pub modified: DateTime<Utc>,
}

impl Car {
    /// Create an unsaved car.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the number of cylinders.
    #[must_use]
    pub const fn with_cylinders(mut self, cylinders: u8) -> Self {
        self.cylinders = Some(cylinders);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_car_is_unassigned() {
        let car = Car::new("Honda", "Civic");
        assert_eq!(car.car_id, CarId::UNASSIGNED);
        assert!(!car.car_id.is_assigned());
        assert_eq!(car.cylinders, None);
    }

    #[test]
    fn car_id_displays_as_integer() {
        assert_eq!(CarId::new(42).to_string(), "42");
    }
}
