//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HAAT_API_URL` - Base URL of the storefront REST API (e.g. `https://api.example.com`)
//!
//! ## Optional
//! - `HAAT_SITE_URL` - Public site URL used for share and tracking links
//!   (falls back to `VITE_SITE_URL`, then to `HAAT_API_URL`)
//! - `HAAT_DATA_DIR` - Directory for persisted client state (default: `.haat`)
//! - `HAAT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `HAAT_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `HAAT_MERGE_GUEST_CART` - `true` to merge the guest cart into the
//!   server cart on login instead of discarding it
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::cart::GuestCartPolicy;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_DATA_DIR: &str = ".haat";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the REST API
    pub api_url: Url,
    /// Public site URL
    pub site_url: Url,
    /// Directory holding persisted client storage
    pub data_dir: PathBuf,
    /// Request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Lifetime of cached catalog responses
    pub cache_ttl: Duration,
    /// What happens to the guest cart when a user signs in
    pub guest_cart_policy: GuestCartPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `HAAT_API_URL` is missing or any variable is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_base_url("HAAT_API_URL", &get_required_env("HAAT_API_URL")?)?;
        let site_url = match get_optional_env("HAAT_SITE_URL")
            .map(|v| ("HAAT_SITE_URL", v))
            .or_else(|| get_optional_env("VITE_SITE_URL").map(|v| ("VITE_SITE_URL", v)))
        {
            Some((key, value)) => parse_base_url(key, &value)?,
            None => api_url.clone(),
        };

        let data_dir = PathBuf::from(get_env_or_default("HAAT_DATA_DIR", DEFAULT_DATA_DIR));
        let request_timeout = get_optional_env("HAAT_REQUEST_TIMEOUT_SECS")
            .map(|v| parse_secs("HAAT_REQUEST_TIMEOUT_SECS", &v))
            .transpose()?;
        let cache_ttl = get_optional_env("HAAT_CACHE_TTL_SECS")
            .map(|v| parse_secs("HAAT_CACHE_TTL_SECS", &v))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS));
        let guest_cart_policy = match get_optional_env("HAAT_MERGE_GUEST_CART") {
            Some(v) if parse_bool("HAAT_MERGE_GUEST_CART", &v)? => GuestCartPolicy::MergeIntoServer,
            _ => GuestCartPolicy::Discard,
        };

        Ok(Self {
            api_url,
            site_url,
            data_dir,
            request_timeout,
            cache_ttl,
            guest_cart_policy,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_url` with every optional value at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute
    /// http(s) URL.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = parse_base_url("HAAT_API_URL", api_url)?;
        Ok(Self {
            site_url: api_url.clone(),
            api_url,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            request_timeout: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            guest_cart_policy: GuestCartPolicy::Discard,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an absolute http(s) URL and make sure it ends in `/` so relative
/// API paths join underneath it.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}
