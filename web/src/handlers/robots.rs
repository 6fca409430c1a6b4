//! `GET /robots.txt`

use crate::config::AppSettings;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::header, response::IntoResponse};

/// Render `robots.txt` for the configured site.
///
/// Indexing is allowed or refused as a whole; when a public site URL is
/// configured the sitemap location is advertised.
#[must_use]
pub fn render_robots(app: &AppSettings) -> String {
    let mut body = String::from("User-agent: *\n");
    body.push_str(if app.allow_indexing {
        "Disallow:\n"
    } else {
        "Disallow: /\n"
    });

    if let Some(site_url) = &app.site_url {
        body.push_str("Sitemap: ");
        body.push_str(site_url.trim_end_matches('/'));
        body.push_str(routes::SITEMAP);
        body.push('\n');
    }

    body
}

/// Serve `robots.txt` as plain text.
#[allow(clippy::unused_async)]
pub async fn robots_txt(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(&state.settings.app),
    )
}
