//! Named routes.
//!
//! Handlers are mounted on these templates, and responses that point at a
//! resource (`201 Created`) build their `Location` from the same name, so
//! the two cannot drift apart.

use car_boilerplate_core::CarId;

/// Path parameter carrying a car identifier.
const CAR_ID_PARAM: &str = ":car_id";

/// Routes served by the cars API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarsRoute {
    /// `DELETE /cars/{carId}`
    DeleteCar,
    /// `GET /cars/{carId}`
    GetCar,
    /// `GET /cars`
    GetCarPage,
    /// `POST /cars`
    PostCar,
    /// `PUT /cars/{carId}`
    PutCar,
}

impl CarsRoute {
    /// Route name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeleteCar => "DeleteCar",
            Self::GetCar => "GetCar",
            Self::GetCarPage => "GetCarPage",
            Self::PostCar => "PostCar",
            Self::PutCar => "PutCar",
        }
    }

    /// Router path template.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::GetCarPage | Self::PostCar => "/cars",
            Self::DeleteCar | Self::GetCar | Self::PutCar => "/cars/:car_id",
        }
    }

    /// Concrete path of this route for `car_id`.
    ///
    /// Routes without a car parameter return their template unchanged.
    #[must_use]
    pub fn path(self, car_id: CarId) -> String {
        self.template().replace(CAR_ID_PARAM, &car_id.to_string())
    }
}

/// Liveness probe.
pub const HEALTH: &str = "/health";

/// Readiness probe.
pub const HEALTH_READY: &str = "/health/ready";

/// Crawler instructions.
pub const ROBOTS: &str = "/robots.txt";

/// Sitemap advertised from `robots.txt`.
pub const SITEMAP: &str = "/sitemap.xml";
