//! Mappers between view models and the domain model.
//!
//! A mapper is a pure, stateless conversion. Commands receive mappers as
//! `Arc<dyn Mapper<S, D>>` so tests can swap them like any other collaborator.

use crate::model::Car;
use crate::view_models::{CarView, SaveCar};

/// Converts a source shape into a destination shape.
pub trait Mapper<S, D>: Send + Sync {
    /// Copy everything the mapper owns from `source` onto `destination`.
    ///
    /// Fields the mapper does not own are left untouched, which is what
    /// allows a replace operation to map onto an already-persisted model.
    fn map_into(&self, source: &S, destination: &mut D);

    /// Create a new destination from `source`.
    fn map(&self, source: &S) -> D
    where
        D: Default,
    {
        let mut destination = D::default();
        self.map_into(source, &mut destination);
        destination
    }
}

/// Maps an inbound [`SaveCar`] onto a domain [`Car`].
///
/// Never writes `car_id`, `created` or `modified`; those belong to the
/// repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveCarToCarMapper;

impl Mapper<SaveCar, Car> for SaveCarToCarMapper {
    fn map_into(&self, source: &SaveCar, destination: &mut Car) {
        destination.cylinders = source.cylinders;
        destination.make.clone_from(&source.make);
        destination.model.clone_from(&source.model);
    }
}

/// Maps a domain [`Car`] to the outbound [`CarView`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CarToCarViewMapper;

impl Mapper<Car, CarView> for CarToCarViewMapper {
    fn map_into(&self, source: &Car, destination: &mut CarView) {
        destination.car_id = source.car_id;
        destination.cylinders = source.cylinders;
        destination.make.clone_from(&source.make);
        destination.model.clone_from(&source.model);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CarId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn save_car_maps_to_unassigned_car() {
        let save_car = SaveCar {
            cylinders: Some(4),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
        };

        let car = SaveCarToCarMapper.map(&save_car);

        assert_eq!(car.car_id, CarId::UNASSIGNED);
        assert_eq!(car.cylinders, Some(4));
        assert_eq!(car.make, "Toyota");
        assert_eq!(car.model, "Corolla");
    }

    #[test]
    fn map_into_preserves_repository_fields() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut car = Car {
            car_id: CarId::new(9),
            created,
            modified: created,
            ..Car::new("Honda", "Civic")
        };

        SaveCarToCarMapper.map_into(&SaveCar::new("Honda", "Accord"), &mut car);

        assert_eq!(car.car_id, CarId::new(9));
        assert_eq!(car.created, created);
        assert_eq!(car.model, "Accord");
    }

    #[test]
    fn car_maps_to_view() {
        let car = Car {
            car_id: CarId::new(3),
            ..Car::new("Ford", "Focus").with_cylinders(4)
        };

        let view = CarToCarViewMapper.map(&car);

        assert_eq!(
            view,
            CarView {
                car_id: CarId::new(3),
                cylinders: Some(4),
                make: "Ford".to_string(),
                model: "Focus".to_string(),
            }
        );
    }
}
