//! Application state for Axum handlers.

use crate::commands::CarCommands;
use crate::config::Settings;
use car_boilerplate_core::repository::CarRepository;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request by Axum, so every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Validated settings the application was started with
    pub settings: Arc<Settings>,
    /// Car store, also used by the readiness probe
    pub repository: Arc<dyn CarRepository>,
    /// Commands, one per car endpoint
    pub commands: Arc<CarCommands>,
    /// Cancelled when the server begins shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create state with the standard car mappers.
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        repository: Arc<dyn CarRepository>,
        shutdown: CancellationToken,
    ) -> Self {
        let commands = Arc::new(CarCommands::with_default_mappers(Arc::clone(&repository)));
        Self {
            settings,
            repository,
            commands,
            shutdown,
        }
    }

    /// Token for one request.
    ///
    /// Cancelled on server shutdown, or when the caller drops the guard it
    /// holds for the token (which happens when the client disconnects and
    /// Hyper drops the handler future).
    #[must_use]
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("settings", &self.settings)
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use car_boilerplate_testing::helpers::empty_repository;

    #[test]
    fn test_state_is_clone() {
        // Axum requires Clone state
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn request_tokens_follow_shutdown() {
        let shutdown = CancellationToken::new();
        let state = AppState::new(
            Arc::new(Settings::default()),
            Arc::new(empty_repository()),
            shutdown.clone(),
        );

        let first = state.request_token();
        let second = state.request_token();
        first.cancel();
        assert!(!second.is_cancelled());
        assert!(!shutdown.is_cancelled());

        shutdown.cancel();
        assert!(second.is_cancelled());
    }
}
