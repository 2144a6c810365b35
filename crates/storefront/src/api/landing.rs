//! Landing page endpoints.

use haat_core::{LandingPage, LandingPageId, LeadRequest};
use serde_json::Value;
use tracing::{debug, instrument};

use super::cache::CacheValue;
use super::{ApiClient, ApiError, extract_object};

impl ApiClient {
    /// Get a landing page by slug, active or not.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown slugs, or another error if
    /// the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn landing_page(&self, slug: &str) -> Result<LandingPage, ApiError> {
        let cache_key = format!("landing:{slug}");

        if let Some(CacheValue::LandingPage(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for landing page");
            return Ok(*page);
        }

        let path = format!("api/landing-pages/slug/{}", urlencoding::encode(slug));
        let value: Value = self.get(&path, None).await?;
        let page: LandingPage = extract_object(value, "landingPage")?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::LandingPage(Box::new(page.clone())))
            .await;

        Ok(page)
    }

    /// Record a lead against a landing page.
    ///
    /// # Errors
    ///
    /// Returns an error with the backend's message if the lead is rejected,
    /// or if the request fails.
    #[instrument(skip(self, lead), fields(landing_page_id = %id))]
    pub async fn submit_lead(&self, id: &LandingPageId, lead: &LeadRequest) -> Result<(), ApiError> {
        let path = format!("api/landing-pages/{}/leads", urlencoding::encode(id.as_str()));
        self.post_discard(&path, lead, None).await
    }
}
