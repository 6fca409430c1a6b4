//! Axum application for the car boilerplate.
//!
//! This crate is the imperative shell around [`car_boilerplate_core`]: it
//! loads settings, registers services, wires the middleware pipeline and
//! exposes car resources over HTTP.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** passes the middleware pipeline (see [`startup`])
//! 2. **Handler** extracts path, query and JSON body
//! 3. **Command** maps the payload, calls the repository under the
//!    request's cancellation token and maps the result to a view
//! 4. **Response** is serialized, or an [`AppError`] is rendered as JSON
//!
//! # Example
//!
//! ```ignore
//! use car_boilerplate_core::{environment::SystemClock, repository::InMemoryCarRepository};
//! use car_boilerplate_web::{Environment, Settings, Startup};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let startup = Startup::new(Settings::load(Environment::from_env()?)?);
//! let repository = Arc::new(InMemoryCarRepository::new(Arc::new(SystemClock)));
//! let state = startup.configure_services(repository, CancellationToken::new());
//! let router = startup.configure(state)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routes;
pub mod startup;
pub mod state;

// Re-export key types for convenience
pub use commands::{CarCommands, CommandError, PostCarCommand};
pub use config::{Environment, Settings, SettingsError};
pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
pub use responses::CreatedAtRoute;
pub use routes::CarsRoute;
pub use startup::{Startup, serve};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
