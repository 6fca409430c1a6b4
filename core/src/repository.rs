//! Car repository.
//!
//! [`CarRepository`] abstracts persistence for one entity type. It is object
//! safe so the web layer can hold it as `Arc<dyn CarRepository>` and swap the
//! in-memory store for a database-backed one without touching the commands.

use crate::environment::Clock;
use crate::model::{Car, CarId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors raised by a [`CarRepository`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No car exists with the given identifier.
    #[error("Car {0} not found")]
    NotFound(CarId),

    /// The backing store could not serve the request.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations for cars.
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Store a new car.
    ///
    /// The repository assigns `car_id`, `created` and `modified`; whatever
    /// identifier the caller put on the model is discarded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the store cannot be written.
    async fn add(&self, car: Car) -> Result<Car>;

    /// Fetch a car by identifier, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the store cannot be read.
    async fn get(&self, car_id: CarId) -> Result<Option<Car>>;

    /// Fetch one page of cars ordered by identifier.
    ///
    /// `page` is 1-based. Pages past the end are empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the store cannot be read.
    async fn get_page(&self, page: u32, count: u32) -> Result<Vec<Car>>;

    /// Number of stored cars.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the store cannot be read.
    async fn total_count(&self) -> Result<u64>;

    /// Replace an existing car, refreshing `modified`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no car has `car.car_id`.
    async fn update(&self, car: Car) -> Result<Car>;

    /// Remove a car.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no car has `car_id`.
    async fn delete(&self, car_id: CarId) -> Result<()>;
}

/// In-memory car repository.
///
/// Identifiers start at 1 and are never reused, even after a delete.
pub struct InMemoryCarRepository {
    cars: RwLock<BTreeMap<CarId, Car>>,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl InMemoryCarRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            cars: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            clock,
        }
    }

    /// Create a repository pre-populated with a few sample cars.
    #[must_use]
    pub fn with_seed_data(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let seed = [
            Car::new("Honda", "Civic").with_cylinders(4),
            Car::new("Ford", "Mustang").with_cylinders(8),
            Car::new("Tesla", "Model 3"),
        ];

        let mut cars = BTreeMap::new();
        let mut next_id = 1;
        for car in seed {
            let car_id = CarId::new(next_id);
            next_id += 1;
            cars.insert(
                car_id,
                Car {
                    car_id,
                    created: now,
                    modified: now,
                    ..car
                },
            );
        }

        Self {
            cars: RwLock::new(cars),
            next_id: AtomicU64::new(next_id),
            clock,
        }
    }

    fn allocate_id(&self) -> CarId {
        CarId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Debug for InMemoryCarRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCarRepository")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CarRepository for InMemoryCarRepository {
    async fn add(&self, car: Car) -> Result<Car> {
        let now = self.clock.now();
        let car = Car {
            car_id: self.allocate_id(),
            created: now,
            modified: now,
            ..car
        };

        self.cars.write().await.insert(car.car_id, car.clone());
        tracing::debug!(car_id = %car.car_id, "Car added");
        Ok(car)
    }

    async fn get(&self, car_id: CarId) -> Result<Option<Car>> {
        Ok(self.cars.read().await.get(&car_id).cloned())
    }

    async fn get_page(&self, page: u32, count: u32) -> Result<Vec<Car>> {
        let skip = usize::try_from(u64::from(page.saturating_sub(1)) * u64::from(count))
            .unwrap_or(usize::MAX);
        let take = usize::try_from(count).unwrap_or(usize::MAX);

        Ok(self
            .cars
            .read()
            .await
            .values()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn total_count(&self) -> Result<u64> {
        Ok(self.cars.read().await.len() as u64)
    }

    async fn update(&self, car: Car) -> Result<Car> {
        let mut cars = self.cars.write().await;
        let existing = cars
            .get_mut(&car.car_id)
            .ok_or(RepositoryError::NotFound(car.car_id))?;

        *existing = Car {
            created: existing.created,
            modified: self.clock.now(),
            ..car
        };
        tracing::debug!(car_id = %existing.car_id, "Car updated");
        Ok(existing.clone())
    }

    async fn delete(&self, car_id: CarId) -> Result<()> {
        self.cars
            .write()
            .await
            .remove(&car_id)
            .map(|_| tracing::debug!(car_id = %car_id, "Car deleted"))
            .ok_or(RepositoryError::NotFound(car_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    /// Clock that advances one second on every read.
    struct SteppingClock(Mutex<DateTime<Utc>>);

    impl SteppingClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            )))
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut time = self.0.lock().unwrap();
            *time += Duration::seconds(1);
            *time
        }
    }

    #[tokio::test]
    async fn add_assigns_sequential_ids_and_timestamps() {
        let repository = InMemoryCarRepository::new(SteppingClock::new());

        let first = repository.add(Car::new("Honda", "Civic")).await.unwrap();
        let second = repository.add(Car::new("Ford", "Focus")).await.unwrap();

        assert_eq!(first.car_id, CarId::new(1));
        assert_eq!(second.car_id, CarId::new(2));
        assert_eq!(first.created, first.modified);
        assert!(second.created > first.created);
    }

    #[tokio::test]
    async fn add_discards_caller_supplied_id() {
        let repository = InMemoryCarRepository::new(SteppingClock::new());
        let car = Car {
            car_id: CarId::new(999),
            ..Car::new("Honda", "Civic")
        };

        let stored = repository.add(car).await.unwrap();

        assert_eq!(stored.car_id, CarId::new(1));
        assert!(repository.get(CarId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_created_and_bumps_modified() {
        let repository = InMemoryCarRepository::new(SteppingClock::new());
        let stored = repository.add(Car::new("Honda", "Civic")).await.unwrap();

        let updated = repository
            .update(Car {
                model: "Accord".to_string(),
                ..stored.clone()
            })
            .await
            .unwrap();

        assert_eq!(updated.created, stored.created);
        assert!(updated.modified > stored.modified);
        assert_eq!(updated.model, "Accord");
    }

    #[tokio::test]
    async fn update_missing_car_is_not_found() {
        let repository = InMemoryCarRepository::new(SteppingClock::new());
        let car = Car {
            car_id: CarId::new(5),
            ..Car::new("Honda", "Civic")
        };

        let err = repository.update(car).await.unwrap_err();
        assert_eq!(err, RepositoryError::NotFound(CarId::new(5)));
    }

    #[tokio::test]
    async fn delete_removes_and_never_reuses_ids() {
        let repository = InMemoryCarRepository::new(SteppingClock::new());
        let stored = repository.add(Car::new("Honda", "Civic")).await.unwrap();

        repository.delete(stored.car_id).await.unwrap();
        assert_eq!(
            repository.delete(stored.car_id).await.unwrap_err(),
            RepositoryError::NotFound(stored.car_id)
        );

        let next = repository.add(Car::new("Ford", "Focus")).await.unwrap();
        assert_eq!(next.car_id, CarId::new(2));
    }

    #[tokio::test]
    async fn get_page_slices_in_id_order() {
        let repository = InMemoryCarRepository::with_seed_data(SteppingClock::new());
        repository.add(Car::new("Kia", "Rio")).await.unwrap();

        let first = repository.get_page(1, 3).await.unwrap();
        let second = repository.get_page(2, 3).await.unwrap();
        let beyond = repository.get_page(3, 3).await.unwrap();

        assert_eq!(
            first.iter().map(|c| c.car_id.value()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].make, "Kia");
        assert!(beyond.is_empty());
        assert_eq!(repository.total_count().await.unwrap(), 4);
    }
}
