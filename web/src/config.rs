//! Application settings.
//!
//! Settings are layered with figment, later sources overriding earlier ones:
//!
//! 1. Compiled defaults ([`Settings::default`])
//! 2. `config/appsettings.yaml`
//! 3. `config/appsettings.{environment}.yaml`
//! 4. Environment variables prefixed `APP__`, nested with `__`
//!    (e.g. `APP__SERVER__PORT=9000`, `APP__APPSETTINGS__SITE_TITLE=Cars`)
//!
//! Missing files are skipped. The `AppSettings` section binds into the
//! strongly typed [`AppSettings`] struct.
//!
//! # Example
//!
//! ```no_run
//! use car_boilerplate_web::config::{Environment, Settings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(Environment::from_env()?)?;
//! println!("Listening on {}", settings.server.bind_address());
//! # Ok(())
//! # }
//! ```

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Directory searched for settings files when none is given.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable selecting the deployment environment.
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "APP__";

/// Name of the cache profile applied to car reads.
pub const CAR_CACHE_PROFILE: &str = "car";

/// Name of the cache profile applied to `robots.txt`.
pub const ROBOTS_CACHE_PROFILE: &str = "robots";

/// Cache profile applied to `/sitemap.xml`.
pub const SITEMAP_CACHE_PROFILE: &str = "sitemap";

/// Settings error.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or did not match the expected shape.
    #[error("Failed to load settings: {0}")]
    Load(#[from] Box<figment::Error>),

    /// Settings were read but are not usable.
    #[error("Invalid settings: {0}")]
    Invalid(String),

    /// The deployment environment name is unknown.
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment (local)
    #[default]
    Development,
    /// Staging environment (pre-production)
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Parse an environment name.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidEnvironment` for unknown names.
    pub fn parse(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(SettingsError::InvalidEnvironment(s.to_string())),
        }
    }

    /// Read the environment from `APP_ENVIRONMENT`, defaulting to development.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidEnvironment` if the variable holds an
    /// unknown name.
    pub fn from_env() -> Result<Self, SettingsError> {
        std::env::var(ENVIRONMENT_VAR).map_or(Ok(Self::Development), |value| Self::parse(&value))
    }

    /// Check if this is production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Where a cached response may be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheLocation {
    /// Shared caches and the client
    Any,
    /// The client only
    Client,
    /// Nowhere without revalidation
    None,
}

/// Named set of HTTP caching directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheProfile {
    /// Lifetime in seconds
    pub duration_secs: u64,
    /// Where the response may be cached
    pub location: CacheLocation,
    /// Forbid storing the response at all
    #[serde(default)]
    pub no_store: bool,
}

impl CacheProfile {
    /// Profile for responses that may be cached publicly for `duration_secs`.
    #[must_use]
    pub const fn public(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            location: CacheLocation::Any,
            no_store: false,
        }
    }

    /// Render the profile as a `Cache-Control` header value.
    #[must_use]
    pub fn cache_control(&self) -> String {
        if self.no_store {
            return "no-store".to_string();
        }
        match self.location {
            CacheLocation::Any => format!("public, max-age={}", self.duration_secs),
            CacheLocation::Client => format!("private, max-age={}", self.duration_secs),
            CacheLocation::None => "no-cache".to_string(),
        }
    }
}

/// The `AppSettings` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Human-readable site name
    pub site_title: String,
    /// Absolute public URL of the site, used for the sitemap link in `robots.txt`
    pub site_url: Option<String>,
    /// Whether search engines may index the site
    pub allow_indexing: bool,
    /// Value of the `Content-Security-Policy` header
    pub content_security_policy: String,
    /// Named cache profiles
    pub cache_profiles: BTreeMap<String, CacheProfile>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let mut cache_profiles = BTreeMap::new();
        cache_profiles.insert(CAR_CACHE_PROFILE.to_string(), CacheProfile::public(60));
        cache_profiles.insert(ROBOTS_CACHE_PROFILE.to_string(), CacheProfile::public(86_400));
        cache_profiles.insert(SITEMAP_CACHE_PROFILE.to_string(), CacheProfile::public(3_600));

        Self {
            site_title: "Car Boilerplate".to_string(),
            site_url: None,
            allow_indexing: true,
            content_security_policy: "default-src 'self'; object-src 'none'; frame-ancestors 'none'"
                .to_string(),
            cache_profiles,
        }
    }
}

impl AppSettings {
    /// Look up a cache profile by name.
    #[must_use]
    pub fn cache_profile(&self, name: &str) -> Option<&CacheProfile> {
        self.cache_profiles.get(name)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Requests running longer than this are answered with 408
    pub request_timeout_secs: u64,
    /// Directory served for paths no route matches.
    ///
    /// With `lowercase_urls` on, directory names in request paths are
    /// lowercased before lookup, so subdirectories here should be lowercase.
    pub static_dir: PathBuf,
    /// Redirect paths containing upper-case characters to their lower-case form
    pub lowercase_urls: bool,
    /// Redirect paths ending in `/` to the path without it
    pub trim_trailing_slash: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            static_dir: PathBuf::from("static"),
            lowercase_urls: true,
            trim_trailing_slash: true,
        }
    }
}

impl ServerSettings {
    /// `host:port` string to bind the listener to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Complete application settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Strongly typed application options
    #[serde(rename = "AppSettings", alias = "appsettings")]
    pub app: AppSettings,
    /// HTTP server options
    pub server: ServerSettings,
    /// Environment the settings were loaded for
    #[serde(skip)]
    pub environment: Environment,
}

impl Settings {
    /// Load settings for `environment` from [`DEFAULT_CONFIG_DIR`].
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or validation fails.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_DIR), environment)
    }

    /// Load settings for `environment` from `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or validation fails.
    pub fn load_from(config_dir: &Path, environment: Environment) -> Result<Self, SettingsError> {
        let mut settings: Self = Self::figment(config_dir, environment).extract()?;
        settings.environment = environment;
        settings.validate()?;

        tracing::debug!(
            environment = %environment,
            config_dir = %config_dir.display(),
            "Settings loaded"
        );
        Ok(settings)
    }

    /// The layered figment the settings are extracted from.
    #[must_use]
    pub fn figment(config_dir: &Path, environment: Environment) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(config_dir.join("appsettings.yaml")))
            .merge(Yaml::file(
                config_dir.join(format!("appsettings.{environment}.yaml")),
            ))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .lowercase(false)
                    .map(|key| section_key(key.as_str()).into()),
            )
    }

    /// Validate settings
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must be > 0".to_string()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "server.request_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.app.cache_profile(CAR_CACHE_PROFILE).is_none() {
            return Err(SettingsError::Invalid(format!(
                "AppSettings.cache_profiles must define '{CAR_CACHE_PROFILE}'"
            )));
        }
        if HeaderValue::from_str(&self.app.content_security_policy).is_err() {
            return Err(SettingsError::Invalid(
                "AppSettings.content_security_policy is not a valid header value".to_string(),
            ));
        }
        if let Some(site_url) = &self.app.site_url {
            if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
                return Err(SettingsError::Invalid(format!(
                    "AppSettings.site_url must be absolute: {site_url}"
                )));
            }
        }
        Ok(())
    }
}

/// Normalise an environment key (`APPSETTINGS__SITE_TITLE`, prefix already
/// stripped) to the dotted settings key it overrides
/// (`AppSettings.site_title`).
fn section_key(key: &str) -> String {
    let key = key.replace("__", ".").to_ascii_lowercase();
    match key.strip_prefix("appsettings") {
        Some(rest) if rest.is_empty() || rest.starts_with('.') => format!("AppSettings{rest}"),
        _ => key,
    }
}
