//! `GET /cars?page=&count=`

use super::{CarViewMapper, CommandError, CommandResult, cancellable};
use car_boilerplate_core::repository::CarRepository;
use car_boilerplate_core::view_models::{MAX_PAGE_COUNT, total_pages};
use car_boilerplate_core::{CarView, Page, PageOptions};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Lists cars one page at a time.
#[derive(Clone)]
pub struct GetCarPageCommand {
    car_repository: Arc<dyn CarRepository>,
    car_to_car_mapper: CarViewMapper,
}

impl GetCarPageCommand {
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
    /// An empty store yields an empty first page rather than an error.
    ///
    /// # Errors
    ///
    /// - `CommandError::InvalidPage` if `page` is 0 or `count` is outside `1..=20`
    /// - `CommandError::PageNotFound` if `page` is past the last page
    /// - `CommandError::Cancelled` if `cancel` fires first
    pub async fn execute(
        &self,
        options: PageOptions,
        cancel: &CancellationToken,
    ) -> CommandResult<Page<CarView>> {
        if options.page == 0 {
            return Err(CommandError::InvalidPage("page must be >= 1".to_string()));
        }
        if !(1..=MAX_PAGE_COUNT).contains(&options.count) {
            return Err(CommandError::InvalidPage(format!(
                "count must be between 1 and {MAX_PAGE_COUNT}"
            )));
        }

        let total_count = cancellable(cancel, self.car_repository.total_count()).await?;
        if total_count > 0 && u64::from(options.page) > total_pages(total_count, options.count) {
            return Err(CommandError::PageNotFound(options.page));
        }

        let cars = cancellable(
            cancel,
            self.car_repository.get_page(options.page, options.count),
        )
        .await?;
        let items = cars
            .iter()
            .map(|car| self.car_to_car_mapper.map(car))
            .collect();

        Ok(Page::new(options, total_count, items))
    }
}
