//! # Car Boilerplate Core
//!
//! Domain types and the abstractions the web layer is composed from.
//!
//! This crate provides:
//! - **Domain model**: [`model::Car`] with a server-assigned [`model::CarId`]
//! - **View models**: the DTOs exchanged at the HTTP boundary
//! - **Mappers**: pure conversions between view models and the domain model
//! - **Repository**: the persistence abstraction plus an in-memory implementation
//! - **Environment**: injected collaborators such as the [`environment::Clock`]
//!
//! Nothing in here knows about HTTP. The web crate wires these pieces together
//! explicitly at start-up instead of resolving them from a container.
//!
//! ## Data Flow
//!
//! ```text
//! SaveCar ──(SaveCarToCarMapper)──▶ Car ──(CarRepository::add)──▶ Car { car_id }
//!                                                                     │
//!                              CarView ◀──(CarToCarViewMapper)────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use car_boilerplate_core::environment::SystemClock;
//! use car_boilerplate_core::mapping::{CarToCarViewMapper, Mapper, SaveCarToCarMapper};
//! use car_boilerplate_core::repository::{CarRepository, InMemoryCarRepository};
//! use car_boilerplate_core::view_models::SaveCar;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let repository = InMemoryCarRepository::new(Arc::new(SystemClock));
//! let save_car = SaveCar::new("Toyota", "Corolla");
//!
//! let car = SaveCarToCarMapper.map(&save_car);
//! let car = repository.add(car).await.unwrap();
//! let view = CarToCarViewMapper.map(&car);
//!
//! assert_eq!(view.car_id, car.car_id);
//! # });
//! ```

pub mod mapping;
pub mod model;
pub mod repository;
pub mod view_models;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use model::{Car, CarId};
pub use view_models::{CarView, Page, PageOptions, SaveCar};

/// Environment module - injected collaborators
///
/// External effects the domain depends on are abstracted behind traits here
/// so tests can substitute deterministic implementations.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
