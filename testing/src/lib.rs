//! # Car Boilerplate Testing
//!
//! Testing utilities and helpers for the car boilerplate.
//!
//! This crate provides:
//! - Deterministic implementations of environment traits
//! - Repository doubles for failure, stalling and fixed-id scenarios
//! - Fixtures and proptest strategies for view models
//!
//! ## Example
//!
//! ```
//! use car_boilerplate_core::repository::CarRepository;
//! use car_boilerplate_core::{Car, CarId};
//! use car_boilerplate_testing::mocks::FixedIdCarRepository;
//!
//! # tokio_test::block_on(async {
//! let repository = FixedIdCarRepository::new(CarId::new(42));
//! let stored = repository.add(Car::new("Toyota", "Corolla")).await.unwrap();
//! assert_eq!(stored.car_id, CarId::new(42));
//! # });
//! ```

use car_boilerplate_core::environment::Clock;
use chrono::{DateTime, Utc};

/// Mock implementations of environment traits and repositories.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use async_trait::async_trait;
    use car_boilerplate_core::repository::{CarRepository, RepositoryError, Result};
    use car_boilerplate_core::{Car, CarId};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use car_boilerplate_testing::mocks::FixedClock;
    /// use car_boilerplate_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Repository that stores nothing and assigns the same identifier to
    /// every car it is given.
    ///
    /// Records the models passed to `add` so tests can inspect exactly what
    /// reached persistence.
    #[derive(Debug)]
    pub struct FixedIdCarRepository {
        car_id: CarId,
        added: Mutex<Vec<Car>>,
    }

    impl FixedIdCarRepository {
        /// Create a repository that assigns `car_id`.
        #[must_use]
        pub const fn new(car_id: CarId) -> Self {
            Self {
                car_id,
                added: Mutex::new(Vec::new()),
            }
        }

        /// Models received by `add`, as they arrived.
        #[must_use]
        pub fn added(&self) -> Vec<Car> {
            self.added
                .lock()
                .map(|added| added.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl CarRepository for FixedIdCarRepository {
        async fn add(&self, car: Car) -> Result<Car> {
            self.added
                .lock()
                .map_err(|_| RepositoryError::Unavailable("poisoned".to_string()))?
                .push(car.clone());

            let now = test_clock().now();
            Ok(Car {
                car_id: self.car_id,
                created: now,
                modified: now,
                ..car
            })
        }

        async fn get(&self, _car_id: CarId) -> Result<Option<Car>> {
            Ok(None)
        }

        async fn get_page(&self, _page: u32, _count: u32) -> Result<Vec<Car>> {
            Ok(Vec::new())
        }

        async fn total_count(&self) -> Result<u64> {
            Ok(0)
        }

        async fn update(&self, car: Car) -> Result<Car> {
            Err(RepositoryError::NotFound(car.car_id))
        }

        async fn delete(&self, car_id: CarId) -> Result<()> {
            Err(RepositoryError::NotFound(car_id))
        }
    }

    /// Repository whose every operation fails as unavailable.
    #[derive(Debug, Default)]
    pub struct FailingCarRepository;

    impl FailingCarRepository {
        fn error() -> RepositoryError {
            RepositoryError::Unavailable("store offline".to_string())
        }
    }

    #[async_trait]
    impl CarRepository for FailingCarRepository {
        async fn add(&self, _car: Car) -> Result<Car> {
            Err(Self::error())
        }

        async fn get(&self, _car_id: CarId) -> Result<Option<Car>> {
            Err(Self::error())
        }

        async fn get_page(&self, _page: u32, _count: u32) -> Result<Vec<Car>> {
            Err(Self::error())
        }

        async fn total_count(&self) -> Result<u64> {
            Err(Self::error())
        }

        async fn update(&self, _car: Car) -> Result<Car> {
            Err(Self::error())
        }

        async fn delete(&self, _car_id: CarId) -> Result<()> {
            Err(Self::error())
        }
    }

    /// Repository whose operations never complete.
    ///
    /// Counts how many calls were started, which lets cancellation tests
    /// assert the call was reached before it was abandoned.
    #[derive(Debug, Default)]
    pub struct StalledCarRepository {
        calls: AtomicUsize,
    }

    impl StalledCarRepository {
        /// Create a stalled repository.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        /// Number of operations started so far.
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn stall<T>(&self) -> T {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[async_trait]
    impl CarRepository for StalledCarRepository {
        async fn add(&self, _car: Car) -> Result<Car> {
            self.stall().await
        }

        async fn get(&self, _car_id: CarId) -> Result<Option<Car>> {
            self.stall().await
        }

        async fn get_page(&self, _page: u32, _count: u32) -> Result<Vec<Car>> {
            self.stall().await
        }

        async fn total_count(&self) -> Result<u64> {
            self.stall().await
        }

        async fn update(&self, _car: Car) -> Result<Car> {
            self.stall().await
        }

        async fn delete(&self, _car_id: CarId) -> Result<()> {
            self.stall().await
        }
    }
}

/// Test helpers and fixtures.
pub mod helpers {
    use car_boilerplate_core::SaveCar;
    use car_boilerplate_core::repository::InMemoryCarRepository;
    use std::sync::Arc;

    /// The canonical example payload: a Toyota Corolla.
    #[must_use]
    pub fn corolla() -> SaveCar {
        SaveCar::new("Toyota", "Corolla")
    }

    /// Empty in-memory repository on the fixed test clock.
    #[must_use]
    pub fn empty_repository() -> InMemoryCarRepository {
        InMemoryCarRepository::new(Arc::new(super::test_clock()))
    }

    /// In-memory repository with the three sample cars, on the fixed test clock.
    #[must_use]
    pub fn seeded_repository() -> InMemoryCarRepository {
        InMemoryCarRepository::with_seed_data(Arc::new(super::test_clock()))
    }

    /// Install a test-friendly tracing subscriber.
    ///
    /// Safe to call from every test; only the first call takes effect.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use car_boilerplate_core::SaveCar;
    use proptest::prelude::*;

    /// Strategy producing arbitrary, well-formed `SaveCar` payloads.
    pub fn arb_save_car() -> impl Strategy<Value = SaveCar> {
        (
            proptest::option::of(1u8..=16),
            "[A-Za-z][A-Za-z -]{0,23}",
            "[A-Za-z0-9][A-Za-z0-9 -]{0,23}",
        )
            .prop_map(|(cylinders, make, model)| SaveCar {
                cylinders,
                make,
                model,
            })
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::mocks::{FailingCarRepository, FixedIdCarRepository, StalledCarRepository};
    use super::*;
    use car_boilerplate_core::repository::{CarRepository, RepositoryError};
    use car_boilerplate_core::{Car, CarId};
    use std::time::Duration;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[tokio::test]
    async fn fixed_id_repository_records_input() {
        let repository = FixedIdCarRepository::new(CarId::new(42));
        let input = Car {
            car_id: CarId::new(7),
            ..Car::new("Toyota", "Corolla")
        };

        let stored = repository.add(input.clone()).await.unwrap();

        assert_eq!(stored.car_id, CarId::new(42));
        assert_eq!(repository.added(), vec![input]);
    }

    #[tokio::test]
    async fn failing_repository_is_unavailable() {
        let err = FailingCarRepository.total_count().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }

    #[tokio::test]
    async fn stalled_repository_never_completes() {
        let repository = StalledCarRepository::new();

        let outcome =
            tokio::time::timeout(Duration::from_millis(20), repository.total_count()).await;

        assert!(outcome.is_err());
        assert_eq!(repository.calls(), 1);
    }
}
