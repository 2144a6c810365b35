//! Funnel analytics endpoint.

use haat_core::AnalyticsEvent;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Post one analytics event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. Callers normally go through
    /// [`crate::analytics::Analytics`], which never surfaces it.
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn track_event(&self, event: &AnalyticsEvent) -> Result<(), ApiError> {
        self.post_discard("api/analytics/track", event, None).await
    }
}
