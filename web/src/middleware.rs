//! Axum middleware for request tracking, security and HTTP hygiene.
//!
//! This module provides:
//! - **Correlation ID tracking**: extract or generate a correlation ID per request
//! - **Security headers**: `nosniff`, frame denial, referrer policy, CSP and HSTS
//! - **Cache profiles**: `Cache-Control` rendered from a named [`CacheProfile`]
//! - **Canonical URLs**: permanent redirects to lower-case, slash-trimmed paths
//! - **Content negotiation**: `406` when the client cannot accept JSON
//!
//! The order these are stacked in lives in [`crate::startup`].

use crate::config::{CacheProfile, Settings, SettingsError};
use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tower_http::set_header::{MakeHeaderValue, SetResponseHeaderLayer};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
///
/// This layer:
/// - Extracts correlation ID from request header or generates new UUID
/// - Stores correlation ID in request extensions
/// - Creates tracing span with correlation_id field
/// - Injects correlation ID into response header
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S, B> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = axum::http::Response<B>> + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(CorrelationId(correlation_id));

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

/// Correlation ID stored in request extensions by [`CorrelationIdLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

/// Extension trait for reading the correlation ID from a request.
pub trait CorrelationIdExt {
    /// The correlation ID, or `None` if the layer is not installed.
    fn correlation_id(&self) -> Option<Uuid>;
}

impl CorrelationIdExt for Request {
    fn correlation_id(&self) -> Option<Uuid> {
        self.extensions().get::<CorrelationId>().map(|id| id.0)
    }
}

/// Response headers added to every response.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// Build the header set for `settings`.
    ///
    /// `Strict-Transport-Security` is only sent in production.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` if the configured content security
    /// policy is not a valid header value.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let csp = HeaderValue::from_str(&settings.app.content_security_policy).map_err(|_| {
            SettingsError::Invalid(
                "AppSettings.content_security_policy is not a valid header value".to_string(),
            )
        })?;

        let mut headers = vec![
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
            (
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer-when-downgrade"),
            ),
            (header::CONTENT_SECURITY_POLICY, csp),
        ];

        if settings.environment.is_production() {
            headers.push((
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            ));
        }

        Ok(Self { headers })
    }

    /// Add any header not already set by the handler.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.entry(name).or_insert_with(|| value.clone());
        }
    }
}

/// Middleware adding [`SecurityHeaders`] to every response.
pub async fn security_headers(
    State(headers): State<Arc<SecurityHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    headers.apply(response.headers_mut());
    response
}

/// `Cache-Control` value that is only produced for successful responses.
///
/// Errors (a `503` from an unavailable store, a `404` for a missing car)
/// must not be held by shared caches.
#[derive(Debug, Clone)]
pub struct CacheControlOnSuccess(HeaderValue);

impl<B> MakeHeaderValue<axum::http::Response<B>> for CacheControlOnSuccess {
    fn make_header_value(&mut self, response: &axum::http::Response<B>) -> Option<HeaderValue> {
        response.status().is_success().then(|| self.0.clone())
    }
}

/// Layer setting `Cache-Control` from a cache profile on `2xx` responses,
/// unless the handler already set one.
///
/// # Errors
///
/// Returns `SettingsError::Invalid` if the rendered directive is not a valid
/// header value.
pub fn cache_profile_layer(
    profile: &CacheProfile,
) -> Result<SetResponseHeaderLayer<CacheControlOnSuccess>, SettingsError> {
    let value = HeaderValue::from_str(&profile.cache_control())
        .map_err(|_| SettingsError::Invalid("cache profile renders an invalid header".to_string()))?;
    Ok(SetResponseHeaderLayer::if_not_present(
        header::CACHE_CONTROL,
        CacheControlOnSuccess(value),
    ))
}

/// Which canonicalisations [`canonical_url`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalUrlOptions {
    /// Redirect upper-case paths to lower case
    pub lowercase: bool,
    /// Redirect `/path/` to `/path`
    pub trim_trailing_slash: bool,
}

impl CanonicalUrlOptions {
    /// Options from server settings.
    #[must_use]
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            lowercase: settings.server.lowercase_urls,
            trim_trailing_slash: settings.server.trim_trailing_slash,
        }
    }

    /// Canonical form of `path`, or `None` if it already is canonical.
    ///
    /// Leading runs of `/` or `\` always collapse to a single `/`, so the
    /// redirect target can never be read as a protocol-relative URL to
    /// another host.
    ///
    /// Lower-casing is ASCII only and covers every directory segment,
    /// including directories under the static root: `/Css/site.css` is sent
    /// to `/css/site.css`. The last segment keeps its case when it names a
    /// file (contains a dot).
    #[must_use]
    pub fn canonicalize(self, path: &str) -> Option<String> {
        let mut canonical = format!("/{}", path.trim_start_matches(['/', '\\']));

        if self.trim_trailing_slash {
            while canonical.len() > 1 && canonical.ends_with('/') {
                canonical.pop();
            }
        }

        if self.lowercase {
            let (dir, last) = canonical
                .rsplit_once('/')
                .unwrap_or(("", canonical.as_str()));
            let last = if last.contains('.') {
                last.to_string()
            } else {
                last.to_ascii_lowercase()
            };
            canonical = format!("{}/{last}", dir.to_ascii_lowercase());
        }

        (canonical != path).then_some(canonical)
    }
}

/// Middleware answering non-canonical `GET`/`HEAD` requests with `301`.
///
/// The query string is preserved. Other methods pass through untouched so
/// request bodies are never dropped by a redirect.
pub async fn canonical_url(
    State(options): State<CanonicalUrlOptions>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return next.run(request).await;
    }

    let Some(path) = options.canonicalize(request.uri().path()) else {
        return next.run(request).await;
    };

    let location = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    tracing::debug!(from = %request.uri(), to = %location, "Redirecting to canonical URL");
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location)],
    )
        .into_response()
}

/// Middleware returning `406 Not Acceptable` when the `Accept` header rules
/// out JSON. Requests without an `Accept` header are let through.
///
/// Repeated `Accept` lines are read as one comma-separated list.
pub async fn require_json_acceptable(request: Request, next: Next) -> Response {
    let accept = request
        .headers()
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");
    let acceptable = accept.trim().is_empty() || accepts_json(&accept);

    if acceptable {
        next.run(request).await
    } else {
        AppError::not_acceptable("This resource is only available as application/json")
            .into_response()
    }
}

/// Whether an `Accept` header value admits `application/json`.
#[must_use]
pub fn accepts_json(accept: &str) -> bool {
    accept.split(',').any(|range| {
        let mut parts = range.split(';');
        let media = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let refused = parts.any(|param| {
            param
                .trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        });

        !refused
            && (media == "application/json"
                || media == "application/*"
                || media == "*/*"
                || (media.starts_with("application/") && media.ends_with("+json")))
    })
}
