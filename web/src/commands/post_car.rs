//! `POST /cars`

use super::{CarViewMapper, CommandResult, SaveCarMapper, cancellable};
use crate::responses::CreatedAtRoute;
use crate::routes::CarsRoute;
use car_boilerplate_core::repository::CarRepository;
use car_boilerplate_core::{CarView, SaveCar};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Creates a car from a [`SaveCar`] payload.
///
/// Maps the payload to a domain model, persists it, maps the stored model
/// back to a [`CarView`] and answers `201 Created` pointing at
/// [`CarsRoute::GetCar`].
#[derive(Clone)]
pub struct PostCarCommand {
    car_repository: Arc<dyn CarRepository>,
    car_to_car_mapper: CarViewMapper,
    save_car_to_car_mapper: SaveCarMapper,
}

impl PostCarCommand {
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
    /// - `CommandError::Cancelled` if `cancel` fires before the car is stored
    /// - `CommandError::Repository` if the repository fails
    pub async fn execute(
        &self,
        save_car: &SaveCar,
        cancel: &CancellationToken,
    ) -> CommandResult<CreatedAtRoute<CarView>> {
        let car = self.save_car_to_car_mapper.map(save_car);
        let car = cancellable(cancel, self.car_repository.add(car)).await?;
        let car_view = self.car_to_car_mapper.map(&car);
        let created = CreatedAtRoute::new(CarsRoute::GetCar, car_view.car_id, car_view);

        tracing::info!(
            car_id = %created.body().car_id,
            route = created.route().name(),
            location = created.location(),
            "Car created"
        );
        Ok(created)
    }
}
