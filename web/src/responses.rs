//! Typed responses returned by commands.

use crate::routes::CarsRoute;
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use car_boilerplate_core::CarId;
use serde::Serialize;

/// `201 Created` pointing at a named route.
///
/// Renders as status 201, a `Location` header resolved from the route and
/// the route values, and `body` as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAtRoute<T> {
    route: CarsRoute,
    location: String,
    body: T,
}

impl<T> CreatedAtRoute<T> {
    /// Create a response for the resource `car_id` served by `route`.
    #[must_use]
    pub fn new(route: CarsRoute, car_id: CarId, body: T) -> Self {
        Self {
            route,
            location: route.path(car_id),
            body,
        }
    }

    /// The route the `Location` header points at.
    #[must_use]
    pub const fn route(&self) -> CarsRoute {
        self.route
    }

    /// The resolved `Location` header value.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The response body.
    #[must_use]
    pub const fn body(&self) -> &T {
        &self.body
    }
}

impl<T: Serialize> IntoResponse for CreatedAtRoute<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            [(header::LOCATION, self.location)],
            Json(self.body),
        )
            .into_response()
    }
}
