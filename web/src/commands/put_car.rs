//! `PUT /cars/{carId}`

use super::{CarViewMapper, CommandResult, SaveCarMapper, cancellable};
use car_boilerplate_core::repository::{CarRepository, RepositoryError};
use car_boilerplate_core::{CarId, CarView, SaveCar};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Replaces the client-owned fields of an existing car.
#[derive(Clone)]
pub struct PutCarCommand {
    car_repository: Arc<dyn CarRepository>,
    car_to_car_mapper: CarViewMapper,
    save_car_to_car_mapper: SaveCarMapper,
}

impl PutCarCommand {
    /// Create the command.
    #[must_use]
    pub fn new(
        car_repository: Arc<dyn CarRepository>,
        car_to_car_mapper: CarViewMapper,
        save_car_to_car_mapper: SaveCarMapper,
    ) -> Self {
        Self {
            car_repository,
            car_to_car_mapper,
            save_car_to_car_mapper,
        }
    }

    /// Execute the command.
    ///
    /// # Errors
    ///
    /// - `CommandError::Repository(RepositoryError::NotFound)` if no such car exists
    /// - `CommandError::Cancelled` if `cancel` fires first
    pub async fn execute(
        &self,
        car_id: CarId,
        save_car: &SaveCar,
        cancel: &CancellationToken,
    ) -> CommandResult<CarView> {
        let mut car = cancellable(cancel, self.car_repository.get(car_id))
            .await?
            .ok_or(RepositoryError::NotFound(car_id))?;

        self.save_car_to_car_mapper.map_into(save_car, &mut car);
        let car = cancellable(cancel, self.car_repository.update(car)).await?;

        tracing::info!(car_id = %car_id, "Car updated");
        Ok(self.car_to_car_mapper.map(&car))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::commands::{CarCommands, CommandError};
    use car_boilerplate_core::repository::{CarRepository, RepositoryError};
    use car_boilerplate_core::{CarId, SaveCar};
    use car_boilerplate_testing::helpers::seeded_repository;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn replaces_client_fields_and_keeps_id() {
        let repository = Arc::new(seeded_repository());
        let commands = CarCommands::with_default_mappers(repository.clone());
        let save_car = SaveCar {
            cylinders: Some(6),
            make: "Honda".to_string(),
            model: "Accord".to_string(),
        };

        let view = commands
            .put_car
            .execute(CarId::new(1), &save_car, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(view.car_id, CarId::new(1));
        assert_eq!(view.model, "Accord");
        let stored = repository.get(CarId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.cylinders, Some(6));
    }

    #[tokio::test]
    async fn missing_car_is_not_found() {
        let commands = CarCommands::with_default_mappers(Arc::new(seeded_repository()));

        let err = commands
            .put_car
            .execute(
                CarId::new(50),
                &SaveCar::new("Kia", "Rio"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::Repository(RepositoryError::NotFound(_))
        ));
    }
}
