//! Public order tracking.

use haat_core::{Order, OrderId};
use tracing::instrument;
use url::Url;

use crate::api::ApiClient;
use crate::error::{AppError, ValidationError};

/// Looks up orders by id without signing in.
#[derive(Debug, Clone)]
pub struct OrderTracker {
    api: ApiClient,
}

impl OrderTracker {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Look up an order from user input such as `" #65f0c1 "`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty or malformed input, the API's
    /// `NotFound` for unknown orders, or another error if the request fails.
    #[instrument(skip(self))]
    pub async fn track(&self, input: &str) -> Result<Order, AppError> {
        let id = OrderId::parse_tracking(input).map_err(ValidationError::from)?;
        Ok(self.api.track_order(&id).await?)
    }
}

/// Page a customer lands on after placing an order: `{site}/track-order?id=<id>`.
#[must_use]
pub fn tracking_url(site_url: &Url, order_id: &OrderId) -> Url {
    let mut url = site_url.clone();
    {
        let mut segments = url.path().trim_end_matches('/').to_owned();
        segments.push_str("/track-order");
        url.set_path(&segments);
    }
    url.set_query(None);
    url.query_pairs_mut().append_pair("id", order_id.as_str());
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_url() {
        let site = Url::parse("https://haat.example.com/").unwrap();
        assert_eq!(
            tracking_url(&site, &OrderId::new("65f0c1")).as_str(),
            "https://haat.example.com/track-order?id=65f0c1"
        );
    }

    #[test]
    fn test_tracking_url_under_subpath() {
        let site = Url::parse("https://example.com/shop").unwrap();
        assert_eq!(
            tracking_url(&site, &OrderId::new("a b")).as_str(),
            "https://example.com/shop/track-order?id=a+b"
        );
    }
}
