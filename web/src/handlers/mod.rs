//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by concern.

pub mod cars;
pub mod health;
pub mod robots;
pub mod sitemap;

use crate::error::AppError;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};

pub use cars::{delete_car, get_car, get_car_page, post_car, put_car};
pub use health::{health_check, readiness_check};
pub use robots::robots_txt;
pub use sitemap::sitemap_xml;

/// JSON `404` for paths that match neither a route nor a static file.
#[allow(clippy::unused_async)]
pub async fn not_found(uri: Uri) -> Response {
    AppError::route_not_found(uri.path()).into_response()
}
