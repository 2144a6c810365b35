//! Articles, contact messages and public settings.

use haat_core::{Article, ContactMessage, Settings};
use serde_json::Value;
use tracing::{debug, instrument};

use super::cache::CacheValue;
use super::{ApiClient, ApiError, extract_list, extract_object};

impl ApiClient {
    /// List published articles.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn articles(&self) -> Result<Vec<Article>, ApiError> {
        let cache_key = "articles".to_string();

        if let Some(CacheValue::Articles(articles)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for articles");
            return Ok(articles);
        }

        let value: Value = self.get("api/articles", None).await?;
        let articles: Vec<Article> = extract_list(value, &["articles", "data"])?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Articles(articles.clone()))
            .await;

        Ok(articles)
    }

    /// Get an article by slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown slugs, or another error if
    /// the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn article(&self, slug: &str) -> Result<Article, ApiError> {
        let cache_key = format!("article:{slug}");

        if let Some(CacheValue::Article(article)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for article");
            return Ok(*article);
        }

        let path = format!("api/articles/{}", urlencoding::encode(slug));
        let value: Value = self.get(&path, None).await?;
        let article: Article = extract_object(value, "article")?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Article(Box::new(article.clone())))
            .await;

        Ok(article)
    }

    /// Public storefront settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn settings(&self) -> Result<Settings, ApiError> {
        let cache_key = "settings".to_string();

        if let Some(CacheValue::Settings(settings)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for settings");
            return Ok(settings);
        }

        let value: Value = self.get("api/settings", None).await?;
        let settings: Settings = extract_object(value, "settings")?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Settings(settings.clone()))
            .await;

        Ok(settings)
    }

    /// Send a contact-form message.
    ///
    /// # Errors
    ///
    /// Returns an error with the backend's message if the message is
    /// rejected, or if the request fails.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        self.post_discard("api/contacts", message, None).await
    }
}
