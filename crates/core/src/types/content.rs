//! Blog/news articles and site settings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::delivery::DeliveryRates;
use crate::types::id::ArticleId;
use crate::types::price;

/// A blog or news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id", alias = "id")]
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Date to show on the article: publication date, else creation date.
    #[must_use]
    pub fn display_date(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }

    /// Short summary: the excerpt, or the first `max_chars` characters of the body.
    #[must_use]
    pub fn summary(&self, max_chars: usize) -> String {
        if let Some(excerpt) = self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            return excerpt.trim().to_owned();
        }

        let body = self.content.trim();
        if body.chars().count() <= max_chars {
            return body.to_owned();
        }
        let mut summary: String = body.chars().take(max_chars).collect();
        summary.push('…');
        summary
    }
}

/// Public storefront settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(
        default,
        with = "price::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_charge_inside: Option<Decimal>,
    #[serde(
        default,
        with = "price::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_charge_outside: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Settings {
    /// Delivery rates with the configured charges applied over the defaults.
    #[must_use]
    pub fn delivery_rates(&self) -> DeliveryRates {
        DeliveryRates::default()
            .with_overrides(self.delivery_charge_inside, self.delivery_charge_outside)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::delivery::DeliveryArea;

    #[test]
    fn test_summary_prefers_excerpt() {
        let article: Article = serde_json::from_value(json!({
            "_id": "a1", "title": "Mango season", "slug": "mango-season",
            "excerpt": "  It is here. ", "content": "Long body"
        }))
        .unwrap();
        assert_eq!(article.summary(5), "It is here.");
    }

    #[test]
    fn test_summary_truncates_content() {
        let article: Article = serde_json::from_value(json!({
            "_id": "a1", "title": "t", "slug": "t", "content": "আমের মৌসুম এসেছে"
        }))
        .unwrap();
        assert_eq!(article.summary(4), "আমের…");
    }

    #[test]
    fn test_settings_delivery_rates() {
        let settings: Settings =
            serde_json::from_value(json!({"deliveryChargeOutside": "150"})).unwrap();
        let rates = settings.delivery_rates();
        assert_eq!(rates.charge(DeliveryArea::InsideDhaka), Decimal::from(60));
        assert_eq!(rates.charge(DeliveryArea::OutsideDhaka), Decimal::from(150));
    }
}
