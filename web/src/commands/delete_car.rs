//! `DELETE /cars/{carId}`

use super::{CommandResult, cancellable};
use car_boilerplate_core::CarId;
use car_boilerplate_core::repository::CarRepository;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Deletes one car.
#[derive(Clone)]
pub struct DeleteCarCommand {
    car_repository: Arc<dyn CarRepository>,
}

impl DeleteCarCommand {
    /// Create the command.
    #[must_use]
    pub fn new(car_repository: Arc<dyn CarRepository>) -> Self {
        Self { car_repository }
    }

    /// Execute the command.
    ///
    /// # Errors
    ///
    /// - `CommandError::Repository(RepositoryError::NotFound)` if no such car exists
    /// - `CommandError::Cancelled` if `cancel` fires first
    pub async fn execute(&self, car_id: CarId, cancel: &CancellationToken) -> CommandResult<()> {
        cancellable(cancel, self.car_repository.delete(car_id)).await?;
        tracing::info!(car_id = %car_id, "Car deleted");
        Ok(())
    }
}
