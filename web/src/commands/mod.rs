//! Commands: one object per HTTP action.
//!
//! Each command receives its collaborators (repository and mappers) at
//! construction and exposes a single `execute` method. Every repository call
//! is raced against the request's [`CancellationToken`]; a cancelled command
//! returns [`CommandError::Cancelled`] and produces no response body.
//!
//! Commands do no validation beyond what their contract names and do not
//! retry. Repository failures propagate to the caller unchanged.

mod delete_car;
mod get_car;
mod get_car_page;
mod post_car;
mod put_car;

pub use delete_car::DeleteCarCommand;
pub use get_car::GetCarCommand;
pub use get_car_page::GetCarPageCommand;
pub use post_car::PostCarCommand;
pub use put_car::PutCarCommand;

use car_boilerplate_core::mapping::{CarToCarViewMapper, Mapper, SaveCarToCarMapper};
use car_boilerplate_core::repository::{self, CarRepository, RepositoryError};
use car_boilerplate_core::{Car, CarView, SaveCar};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result type alias for commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Mapper from the inbound payload to the domain model.
pub type SaveCarMapper = Arc<dyn Mapper<SaveCar, Car>>;

/// Mapper from the domain model to the outbound view.
pub type CarViewMapper = Arc<dyn Mapper<Car, CarView>>;

/// Errors surfaced by commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The cancellation token fired before the command finished.
    #[error("Request was cancelled")]
    Cancelled,

    /// Paging parameters are out of range.
    #[error("Invalid page request: {0}")]
    InvalidPage(String),

    /// The requested page lies beyond the last page.
    #[error("Page {0} does not exist")]
    PageNotFound(u32),
}

/// Await a repository operation unless `cancel` fires first.
///
/// Cancellation wins ties, so an already-cancelled token never starts the
/// operation.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = repository::Result<T>>,
) -> CommandResult<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CommandError::Cancelled),
        result = operation => result.map_err(CommandError::from),
    }
}

/// All car commands, built over one repository and one pair of mappers.
#[derive(Clone)]
pub struct CarCommands {
    /// `POST /cars`
    pub post_car: PostCarCommand,
    /// `GET /cars/{carId}`
    pub get_car: GetCarCommand,
    /// `GET /cars`
    pub get_car_page: GetCarPageCommand,
    /// `PUT /cars/{carId}`
    pub put_car: PutCarCommand,
    /// `DELETE /cars/{carId}`
    pub delete_car: DeleteCarCommand,
}

impl CarCommands {
    /// Build every command from explicit collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn CarRepository>,
        save_car_to_car: SaveCarMapper,
        car_to_car_view: CarViewMapper,
    ) -> Self {
        Self {
            post_car: PostCarCommand::new(
                Arc::clone(&repository),
                Arc::clone(&car_to_car_view),
                Arc::clone(&save_car_to_car),
            ),
            get_car: GetCarCommand::new(Arc::clone(&repository), Arc::clone(&car_to_car_view)),
            get_car_page: GetCarPageCommand::new(
                Arc::clone(&repository),
                Arc::clone(&car_to_car_view),
            ),
            put_car: PutCarCommand::new(
                Arc::clone(&repository),
                Arc::clone(&car_to_car_view),
                save_car_to_car,
            ),
            delete_car: DeleteCarCommand::new(repository),
        }
    }

    /// Build every command with the standard car mappers.
    #[must_use]
    pub fn with_default_mappers(repository: Arc<dyn CarRepository>) -> Self {
        Self::new(
            repository,
            Arc::new(SaveCarToCarMapper),
            Arc::new(CarToCarViewMapper),
        )
    }
}
