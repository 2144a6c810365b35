//! Funnel analytics events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{LandingPageId, ProductId};
use crate::types::status::AnalyticsEventType;

/// One event posted to the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub event_type: AnalyticsEventType,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_page_id: Option<LandingPageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// A new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: AnalyticsEventType, session_id: impl Into<String>) -> Self {
        Self {
            event_type,
            session_id: session_id.into(),
            landing_page_id: None,
            product_id: None,
            path: None,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the landing page the event happened on.
    #[must_use]
    pub fn with_landing_page(mut self, id: LandingPageId) -> Self {
        self.landing_page_id = Some(id);
        self
    }

    /// Attach the product the event concerns.
    #[must_use]
    pub fn with_product(mut self, id: ProductId) -> Self {
        self.product_id = Some(id);
        self
    }

    /// Attach the page path the event happened on.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach free-form metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
