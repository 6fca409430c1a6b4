//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check dependencies.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Component that was checked
    pub component: &'static str,
    /// `"Healthy"` or `"Unhealthy"`
    pub status: &'static str,
    /// Human-readable detail
    pub message: String,
}

/// Health check against the car store (for readiness).
///
/// # Status Codes
///
/// - 200 OK: the store answered
/// - 503 Service Unavailable: the store failed
///
/// # Endpoint
///
/// ```text
/// GET /health/ready
/// ```
///
/// # Response
///
/// ```json
/// {
///   "component": "car_repository",
///   "status": "Healthy",
///   "message": "3 cars stored"
/// }
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    match state.repository.total_count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthReport {
                component: "car_repository",
                status: "Healthy",
                message: format!("{count} cars stored"),
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport {
                    component: "car_repository",
                    status: "Unhealthy",
                    message: err.to_string(),
                }),
            )
        }
    }
}
