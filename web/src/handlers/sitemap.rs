//! `GET /sitemap.xml`

use crate::WebResult;
use crate::commands::cancellable;
use crate::error::AppError;
use crate::routes::{self, CarsRoute};
use crate::state::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use car_boilerplate_core::Car;

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapUrl {
    /// Absolute URL
    pub loc: String,
    /// Last modification date, `YYYY-MM-DD`
    pub lastmod: Option<String>,
}

/// `templates/sitemap.xml`
#[derive(Template)]
#[template(path = "sitemap.xml")]
pub struct SitemapTemplate {
    /// Entries in document order
    pub urls: Vec<SitemapUrl>,
}

/// Absolute URLs for the car list and every stored car under `site_url`.
#[must_use]
pub fn sitemap_urls(site_url: &str, cars: &[Car]) -> Vec<SitemapUrl> {
    let base = site_url.trim_end_matches('/');
    let mut urls = Vec::with_capacity(cars.len() + 1);
    urls.push(SitemapUrl {
        loc: format!("{base}{}", CarsRoute::GetCarPage.template()),
        lastmod: None,
    });
    urls.extend(cars.iter().map(|car| SitemapUrl {
        loc: format!("{base}{}", CarsRoute::GetCar.path(car.car_id)),
        lastmod: Some(car.modified.date_naive().to_string()),
    }));
    urls
}

/// Serve the sitemap advertised by `robots.txt`.
///
/// Without a configured site URL there is nothing absolute to list, so the
/// route answers `404`.
///
/// # Errors
///
/// `404` without a site URL, `503` if the store is unavailable and `500` if
/// the document cannot be rendered.
pub async fn sitemap_xml(State(state): State<AppState>) -> WebResult<Response> {
    let Some(site_url) = state.settings.app.site_url.as_deref() else {
        return Err(AppError::route_not_found(routes::SITEMAP));
    };

    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let total = cancellable(&cancel, state.repository.total_count()).await?;
    let count = u32::try_from(total).unwrap_or(u32::MAX);
    let cars = if count == 0 {
        Vec::new()
    } else {
        cancellable(&cancel, state.repository.get_page(1, count)).await?
    };

    let body = SitemapTemplate {
        urls: sitemap_urls(site_url, &cars),
    }
    .render()
    .map_err(|e| AppError::internal("Failed to render sitemap").with_source(anyhow::Error::new(e)))?;

    tracing::debug!(urls = cars.len() + 1, "Sitemap rendered");
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], body).into_response())
}
