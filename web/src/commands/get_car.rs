//! `GET /cars/{carId}`

use super::{CarViewMapper, CommandResult, cancellable};
use car_boilerplate_core::repository::{CarRepository, RepositoryError};
use car_boilerplate_core::{CarId, CarView};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fetches one car.
#[derive(Clone)]
pub struct GetCarCommand {
    car_repository: Arc<dyn CarRepository>,
    car_to_car_mapper: CarViewMapper,
}

impl GetCarCommand {
    /// Create the command.
    #[must_use]
    pub fn new(car_repository: Arc<dyn CarRepository>, car_to_car_mapper: CarViewMapper) -> Self {
        Self {
            car_repository,
            car_to_car_mapper,
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
        cancel: &CancellationToken,
    ) -> CommandResult<CarView> {
        let car = cancellable(cancel, self.car_repository.get(car_id))
            .await?
            .ok_or(RepositoryError::NotFound(car_id))?;

        Ok(self.car_to_car_mapper.map(&car))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::commands::{CarCommands, CommandError};
    use car_boilerplate_core::CarId;
    use car_boilerplate_core::repository::RepositoryError;
    use car_boilerplate_testing::helpers::seeded_repository;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn returns_view_of_stored_car() {
        let commands = CarCommands::with_default_mappers(Arc::new(seeded_repository()));

        let view = commands
            .get_car
            .execute(CarId::new(1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(view.car_id, CarId::new(1));
        assert_eq!(view.make, "Honda");
    }

    #[tokio::test]
    async fn missing_car_is_not_found() {
        let commands = CarCommands::with_default_mappers(Arc::new(seeded_repository()));

        let err = commands
            .get_car
            .execute(CarId::new(99), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::Repository(RepositoryError::NotFound(id)) if id == CarId::new(99)
        ));
    }
}
