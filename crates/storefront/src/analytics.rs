//! Best-effort funnel analytics.
//!
//! Events are posted on a spawned task and never awaited by the flow that
//! produced them. A failed send is logged at debug level and otherwise
//! ignored; it can never fail a page view, a lead or an order.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use haat_core::{AnalyticsEvent, AnalyticsEventType, LandingPage};
use tokio::sync::oneshot;
use tokio::task::JoinSet;

use crate::api::ApiClient;
use crate::session::SessionStore;
use crate::storage::{Storage, keys};

/// Handle to a fire-and-forget send.
///
/// Dropping it detaches the send. Awaiting [`BestEffort::outcome`] reports
/// whether the event was delivered; it never returns an error.
#[derive(Debug)]
pub struct BestEffort {
    delivered: oneshot::Receiver<bool>,
}

impl BestEffort {
    /// Wait for the send and report whether it was delivered.
    pub async fn outcome(self) -> bool {
        self.delivered.await.unwrap_or(false)
    }
}

/// Sends funnel events tagged with the anonymous session id.
#[derive(Clone)]
pub struct Analytics {
    api: ApiClient,
    session: Arc<SessionStore>,
    session_scope: Arc<dyn Storage>,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl Analytics {
    /// `session_scope` holds per-visit flags and should not outlive the
    /// process.
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<SessionStore>, session_scope: Arc<dyn Storage>) -> Self {
        Self {
            api,
            session,
            session_scope,
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// The anonymous session id events are tagged with.
    #[must_use]
    pub fn session_id(&self) -> String {
        self.session.analytics_session_id()
    }

    /// A new event of `event_type` for this session.
    #[must_use]
    pub fn event(&self, event_type: AnalyticsEventType) -> AnalyticsEvent {
        AnalyticsEvent::new(event_type, self.session_id())
    }

    /// A new event of `event_type` attributed to a landing page and its product.
    #[must_use]
    pub fn page_event(&self, event_type: AnalyticsEventType, page: &LandingPage) -> AnalyticsEvent {
        let event = self
            .event(event_type)
            .with_landing_page(page.id.clone())
            .with_path(format!("/lp/{}", page.slug));
        match &page.product {
            Some(product) => event.with_product(product.id().clone()),
            None => event,
        }
    }

    /// Send an event in the background.
    pub fn track(&self, event: AnalyticsEvent) -> BestEffort {
        let api = self.api.clone();
        let (tx, delivered) = oneshot::channel();

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn(async move {
            let ok = match api.track_event(&event).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(
                        event_type = %event.event_type,
                        error = %e,
                        "Analytics event dropped"
                    );
                    false
                }
            };
            // Receiver dropped means the caller detached.
            let _ = tx.send(ok);
        });
        BestEffort { delivered }
    }

    /// Wait up to `timeout` for sends still in flight.
    ///
    /// Short-lived front ends call this before exiting so detached events
    /// are not cut off. Sends still running at the deadline are abandoned.
    pub async fn flush(&self, timeout: Duration) {
        let mut pending = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *in_flight)
        };
        if pending.is_empty() {
            return;
        }

        let count = pending.len();
        if tokio::time::timeout(timeout, async { while pending.join_next().await.is_some() {} })
            .await
            .is_err()
        {
            tracing::debug!(count, "Abandoned analytics events at flush deadline");
        }
    }

    /// Record a landing page view at most once per session.
    ///
    /// Returns `None` when the view was already recorded.
    pub fn track_view_once(&self, page: &LandingPage) -> Option<BestEffort> {
        let key = keys::landing_viewed(page.id.as_str());
        match self.session_scope.get(&key) {
            Ok(Some(_)) => return None,
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "Could not read view flag"),
        }
        if let Err(e) = self.session_scope.set(&key, "1") {
            tracing::debug!(error = %e, "Could not set view flag");
        }

        Some(self.track(self.page_event(AnalyticsEventType::Visit, page)))
    }
}

impl std::fmt::Debug for Analytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analytics").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStorage;

    fn analytics() -> Analytics {
        // Nothing listens on port 9; every send fails.
        let config = StorefrontConfig::for_api("http://127.0.0.1:9").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let persistent: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = Arc::new(SessionStore::restore(persistent));
        Analytics::new(api, session, Arc::new(MemoryStorage::new()))
    }

    fn page() -> LandingPage {
        serde_json::from_value(json!({
            "_id": "lp1", "slug": "summer-mango", "product": "p1", "isActive": true
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_failed_send_is_swallowed() {
        let analytics = analytics();
        let outcome = analytics
            .track(analytics.event(AnalyticsEventType::CtaClick))
            .outcome()
            .await;
        assert!(!outcome);
    }

    #[tokio::test]
    async fn test_flush_waits_for_detached_sends() {
        let analytics = analytics();
        drop(analytics.track(analytics.event(AnalyticsEventType::Visit)));
        analytics.flush(Duration::from_secs(5)).await;
        assert!(analytics.in_flight.lock().unwrap().is_empty());

        // Nothing pending returns immediately.
        analytics.flush(Duration::ZERO).await;
    }

    #[tokio::test]
    async fn test_view_is_tracked_once_per_session() {
        let analytics = analytics();
        let page = page();
        assert!(analytics.track_view_once(&page).is_some());
        assert!(analytics.track_view_once(&page).is_none());
    }

    #[tokio::test]
    async fn test_page_event_attribution() {
        let analytics = analytics();
        let event = analytics.page_event(AnalyticsEventType::Lead, &page());
        assert_eq!(event.landing_page_id.unwrap().as_str(), "lp1");
        assert_eq!(event.product_id.unwrap().as_str(), "p1");
        assert_eq!(event.path.as_deref(), Some("/lp/summer-mango"));
        assert_eq!(event.session_id, analytics.session.analytics_session_id());
    }
}
