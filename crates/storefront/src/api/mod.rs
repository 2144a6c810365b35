//! REST API client for the Haat backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth; the client never computes
//!   authoritative state
//! - JSON bodies, `Authorization: Bearer <token>` on authenticated calls
//! - In-memory caching via `moka` for read-only catalog responses
//!   (products, categories, brands, articles, landing pages, settings).
//!   Cart, orders, tracking and auth are never cached.
//!
//! # Example
//!
//! ```rust,ignore
//! use haat_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config)?;
//!
//! let page = api.landing_page("summer-mango").await?;
//! let order = api.track_order(&OrderId::new("65f0c1")).await?;
//! ```

mod analytics;
mod auth;
mod cache;
mod cart;
mod catalog;
mod content;
mod landing;
mod orders;

pub use catalog::ProductQuery;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::StorefrontConfig;
use cache::CacheValue;

/// Maximum number of cached catalog responses.
const CACHE_CAPACITY: u64 = 1000;

/// Errors that can occur when talking to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Missing, invalid or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the failure lies with the transport or the server rather than
    /// with the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unauthorized(_) | Self::NotFound(_) | Self::RateLimited(_) => false,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Haat REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Resolve an API path (without leading slash) against the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url, token: Option<&SecretString>) -> RequestBuilder {
        let request = self.inner.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(self.request(Method::GET, url, token)).await
    }

    async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, url, None)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(self.request(Method::POST, url, token).json(body))
            .await
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(self.request(Method::DELETE, url, token)).await
    }

    /// POST and ignore whatever the API answers with.
    async fn post_discard<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<(), ApiError> {
        self.post::<B, IgnoredAny>(path, body, token)
            .await
            .map(|_| ())
    }

    /// Send a request and decode the JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body, status);
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %truncate(&body, 500),
                    "API returned non-success status"
                );
            } else {
                tracing::warn!(status = %status, message = %message, "API rejected request");
            }

            return Err(match status {
                StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
                StatusCode::NOT_FOUND => ApiError::NotFound(message),
                _ => ApiError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        // Some endpoints answer 201/204 with no body
        let body = if body.trim().is_empty() { "null" } else { &body };

        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(body, 500),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Response helpers
// =============================================================================

/// Pull the human-readable message out of an error body.
///
/// The backend answers errors with `{ "message": ... }`; anything else falls
/// back to the (truncated) body, then to the status reason.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| truncate(trimmed, 200))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Find the list in a response that may be bare or wrapped in an object.
///
/// `keys` are tried in order on wrapper objects; `None` means a wrapper had
/// none of them. `null` is an empty list.
fn list_field(value: Value, keys: &[&str]) -> Option<Value> {
    match value {
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| map.remove(*key).filter(Value::is_array)),
        Value::Null => Some(Value::Array(Vec::new())),
        other => Some(other),
    }
}

/// Decode a list that may arrive bare or wrapped in an object.
///
/// A wrapper without any of `keys` is an empty list.
fn extract_list<T: DeserializeOwned>(value: Value, keys: &[&str]) -> Result<Vec<T>, ApiError> {
    let list = list_field(value, keys).unwrap_or_else(|| {
        tracing::debug!(expected = ?keys, "List response has no recognized field");
        Value::Array(Vec::new())
    });
    Ok(serde_json::from_value(list)?)
}

/// Decode an object that may arrive bare or under `key`.
fn extract_object<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, ApiError> {
    let value = match value {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"Product not found"}"#, StatusCode::NOT_FOUND),
            "Product not found"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body_then_reason() {
        assert_eq!(
            error_message("gateway exploded", StatusCode::BAD_GATEWAY),
            "gateway exploded"
        );
        assert_eq!(
            error_message("", StatusCode::SERVICE_UNAVAILABLE),
            "Service Unavailable"
        );
    }

    #[test]
    fn test_extract_list_accepts_bare_and_wrapped() {
        let bare: Vec<u32> = extract_list(json!([1, 2]), &["items"]).unwrap();
        let wrapped: Vec<u32> = extract_list(json!({"items": [1, 2]}), &["items"]).unwrap();
        let fallback: Vec<u32> =
            extract_list(json!({"data": [1, 2]}), &["categories", "data"]).unwrap();
        assert_eq!(bare, vec![1, 2]);
        assert_eq!(wrapped, bare);
        assert_eq!(fallback, bare);
    }

    #[test]
    fn test_extract_list_empty_cases() {
        let none: Vec<u32> = extract_list(Value::Null, &["items"]).unwrap();
        let missing: Vec<u32> = extract_list(json!({"other": 1}), &["items"]).unwrap();
        assert!(none.is_empty());
        assert!(missing.is_empty());
        assert!(extract_list::<u32>(json!("nope"), &["items"]).is_err());
    }

    #[test]
    fn test_extract_object_unwraps_named_field() {
        #[derive(serde::Deserialize)]
        struct Thing {
            id: String,
        }

        let wrapped: Thing = extract_object(json!({"order": {"id": "o1"}}), "order").unwrap();
        let bare: Thing = extract_object(json!({"id": "o2"}), "order").unwrap();
        assert_eq!(wrapped.id, "o1");
        assert_eq!(bare.id, "o2");
    }

    #[test]
    fn test_server_error_classification() {
        assert!(
            ApiError::Api {
                status: 502,
                message: String::new()
            }
            .is_server_error()
        );
        assert!(
            !ApiError::Api {
                status: 400,
                message: String::new()
            }
            .is_server_error()
        );
        assert!(!ApiError::NotFound("x".to_string()).is_server_error());
    }
}
