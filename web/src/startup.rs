//! Application start-up: service registration and the request pipeline.
//!
//! [`Startup`] owns the loaded [`Settings`] and performs the two start-up
//! phases in order:
//!
//! 1. [`Startup::configure_services`] registers the services handlers depend
//!    on (repository, mappers, commands) into an [`AppState`].
//! 2. [`Startup::configure`] builds the [`Router`] with the middleware
//!    pipeline in a fixed order.
//!
//! # Pipeline
//!
//! Outermost first, so each entry sees requests before the ones below it
//! and responses after them:
//!
//! 1. Correlation ID
//! 2. Request tracing
//! 3. Request timeout (`408`)
//! 4. Security headers
//! 5. Canonical URL redirects (`301`)
//! 6. Response compression
//! 7. Routes: `/cars` (content negotiation, `car` cache profile), health
//!    probes, `robots.txt` (`robots` cache profile), `sitemap.xml` (`sitemap`
//!    cache profile), then static files with a JSON `404` fallback

use crate::config::{
    CAR_CACHE_PROFILE, ROBOTS_CACHE_PROFILE, SITEMAP_CACHE_PROFILE, Settings, SettingsError,
};
use crate::handlers;
use crate::middleware::{
    CanonicalUrlOptions, SecurityHeaders, cache_profile_layer, canonical_url,
    correlation_id_layer, require_json_acceptable, security_headers,
};
use crate::routes::{self, CarsRoute};
use crate::state::AppState;
use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use car_boilerplate_core::repository::CarRepository;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

/// Builds the application from validated settings.
#[derive(Debug, Clone)]
pub struct Startup {
    settings: Arc<Settings>,
}

impl Startup {
    /// Create a start-up for `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// Settings this application runs with.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register application services.
    ///
    /// `shutdown` is the parent of every per-request cancellation token.
    #[must_use]
    pub fn configure_services(
        &self,
        repository: Arc<dyn CarRepository>,
        shutdown: CancellationToken,
    ) -> AppState {
        tracing::debug!(environment = %self.settings.environment, "Registering services");
        AppState::new(Arc::clone(&self.settings), repository, shutdown)
    }

    /// Build the router and its middleware pipeline.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` if a required cache profile is
    /// missing or a configured value cannot be rendered as a header.
    pub fn configure(&self, state: AppState) -> Result<Router, SettingsError> {
        let settings = &self.settings;

        let car_cache = cache_profile_layer(required_profile(settings, CAR_CACHE_PROFILE)?)?;
        let robots_cache = cache_profile_layer(required_profile(settings, ROBOTS_CACHE_PROFILE)?)?;
        let sitemap_cache =
            cache_profile_layer(required_profile(settings, SITEMAP_CACHE_PROFILE)?)?;

        let cars = Router::new()
            .route(
                CarsRoute::GetCarPage.template(),
                get(handlers::get_car_page)
                    .layer(car_cache.clone())
                    .post(handlers::post_car),
            )
            .route(
                CarsRoute::GetCar.template(),
                get(handlers::get_car)
                    .layer(car_cache)
                    .put(handlers::put_car)
                    .delete(handlers::delete_car),
            )
            .route_layer(from_fn(require_json_acceptable));

        let static_files = ServeDir::new(&settings.server.static_dir)
            .call_fallback_on_method_not_allowed(true)
            .not_found_service(handlers::not_found.into_service());

        let mut router = Router::new()
            .merge(cars)
            .route(routes::HEALTH, get(handlers::health_check))
            .route(routes::HEALTH_READY, get(handlers::readiness_check))
            .route(
                routes::ROBOTS,
                get(handlers::robots_txt).layer(robots_cache),
            )
            .route(
                routes::SITEMAP,
                get(handlers::sitemap_xml).layer(sitemap_cache),
            )
            .fallback_service(static_files)
            .with_state(state);

        // Layers are applied innermost first.

        // 6) Compression
        router = router.layer(CompressionLayer::new());

        // 5) Canonical URLs
        router = router.layer(from_fn_with_state(
            CanonicalUrlOptions::from_settings(settings),
            canonical_url,
        ));

        // 4) Security headers, outside redirects so they carry them too
        router = router.layer(from_fn_with_state(
            Arc::new(SecurityHeaders::from_settings(settings)?),
            security_headers,
        ));

        // 3) Timeout
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            settings.server.request_timeout(),
        ));

        // 2) Trace
        router = router.layer(TraceLayer::new_for_http());

        // 1) Correlation ID
        router = router.layer(correlation_id_layer());

        Ok(router)
    }
}

fn required_profile<'a>(
    settings: &'a Settings,
    name: &str,
) -> Result<&'a crate::config::CacheProfile, SettingsError> {
    settings
        .app
        .cache_profile(name)
        .ok_or_else(|| SettingsError::Invalid(format!("cache profile '{name}' is not configured")))
}

/// Serve `router` on `listener` until `shutdown` is cancelled.
///
/// In-flight requests see their tokens cancelled at the same moment and
/// finish with `503`; the server then drains open connections.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "HTTP server listening");
    }

    let signal = {
        let shutdown = shutdown.clone();
        async move {
            shutdown.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        }
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use car_boilerplate_testing::helpers::seeded_repository;
    use tower::ServiceExt;

    fn app(settings: Settings) -> Router {
        let startup = Startup::new(settings);
        let state =
            startup.configure_services(Arc::new(seeded_repository()), CancellationToken::new());
        startup.configure(state).unwrap()
    }

    #[test]
    fn missing_car_profile_fails_configuration() {
        let mut settings = Settings::default();
        settings.app.cache_profiles.remove(CAR_CACHE_PROFILE);
        let startup = Startup::new(settings);
        let state =
            startup.configure_services(Arc::new(seeded_repository()), CancellationToken::new());

        let err = startup.configure(state).unwrap_err();

        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[tokio::test]
    async fn redirects_carry_security_headers() {
        let response = app(Settings::default())
            .oneshot(Request::builder().uri("/Cars").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/cars");
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn car_list_uses_car_cache_profile() {
        let response = app(Settings::default())
            .oneshot(Request::builder().uri("/cars").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=60"
        );
    }
}
