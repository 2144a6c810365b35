//! Landing page funnel: view, call to action, lead or order.
//!
//! Each step records a funnel event (`VISIT`, `CTA_CLICK`, `LEAD`) through
//! [`Analytics`]; none of them waits for or depends on that event.

use haat_core::{AnalyticsEventType, LandingPage, LeadRequest, Order, Phone, Quantity, Review};
use serde_json::json;
use tracing::instrument;

use crate::analytics::{Analytics, BestEffort};
use crate::checkout::{Checkout, CheckoutForm, CheckoutSource};
use crate::error::{AppError, ValidationError, add_breadcrumb};

/// Testimonials shown on pages that have none of their own.
const DEFAULT_REVIEWS: &[(&str, &str, &str)] = &[
    ("Nusrat Jahan", "Dhaka", "Arrived the next day and tasted exactly as promised."),
    ("Tanvir Ahmed", "Chattogram", "Well packed, fair price. Ordering again for my family."),
    ("Farzana Akter", "Sylhet", "Cash on delivery made it easy. The quality surprised me."),
    ("Mahmudul Hasan", "Rajshahi", "Fresh and genuine. The call to confirm the order was quick."),
    ("Sadia Islam", "Khulna", "Better than what I find in the local market."),
    ("Arif Hossain", "Gazipur", "Second order this month. Delivery charge was reasonable."),
];

/// The built-in testimonial pool.
#[must_use]
pub fn default_reviews() -> Vec<Review> {
    DEFAULT_REVIEWS
        .iter()
        .map(|(name, location, text)| Review {
            name: (*name).to_owned(),
            text: (*text).to_owned(),
            rating: Some(5),
            location: Some((*location).to_owned()),
        })
        .collect()
}

/// Lead form input.
#[derive(Debug, Clone, Default)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub note: Option<String>,
}

impl LeadForm {
    fn validate(&self, session_id: String) -> Result<LeadRequest, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::Required("phone"));
        }
        let phone = Phone::parse(&self.phone)?;

        Ok(LeadRequest {
            name: name.to_owned(),
            phone: phone.into_inner(),
            address: non_blank(self.address.as_deref()),
            note: non_blank(self.note.as_deref()),
            session_id: Some(session_id),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Drives a visitor through a campaign landing page.
#[derive(Debug, Clone)]
pub struct LandingFunnel {
    api: crate::api::ApiClient,
    analytics: Analytics,
    checkout: Checkout,
}

impl LandingFunnel {
    #[must_use]
    pub const fn new(api: crate::api::ApiClient, analytics: Analytics, checkout: Checkout) -> Self {
        Self {
            api,
            analytics,
            checkout,
        }
    }

    /// Load an active landing page and record the visit once per session.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown or inactive pages, or another
    /// error if the request fails.
    #[instrument(skip(self))]
    pub async fn open(&self, slug: &str) -> Result<LandingPage, AppError> {
        let page = self.api.landing_page(slug.trim()).await?;
        if !page.is_active {
            return Err(AppError::NotFound(format!("landing page {slug}")));
        }

        // Detached; the view is recorded in the background.
        self.analytics.track_view_once(&page);
        Ok(page)
    }

    /// Record a call-to-action click.
    pub fn cta_click(&self, page: &LandingPage) -> BestEffort {
        self.analytics
            .track(self.analytics.page_event(AnalyticsEventType::CtaClick, page))
    }

    /// Submit a lead for the page and record it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a missing name or bad phone number, or
    /// the API's error if the lead is rejected.
    #[instrument(skip(self, page, form), fields(landing_page_id = %page.id))]
    pub async fn submit_lead(&self, page: &LandingPage, form: &LeadForm) -> Result<(), AppError> {
        let lead = form.validate(self.analytics.session_id())?;
        add_breadcrumb("landing", "Submitted lead", Some(&[("landing_page_id", page.id.as_str())]));

        self.api.submit_lead(&page.id, &lead).await?;

        self.analytics.track(
            self.analytics
                .page_event(AnalyticsEventType::Lead, page)
                .with_metadata(json!({"source": "lead_form"})),
        );
        Ok(())
    }

    /// Order the page's product at the campaign price and record the lead.
    ///
    /// # Errors
    ///
    /// Returns whatever preparing or placing the order returns.
    #[instrument(skip(self, page, form), fields(landing_page_id = %page.id))]
    pub async fn buy(
        &self,
        page: &LandingPage,
        quantity: Quantity,
        form: &CheckoutForm,
    ) -> Result<Order, AppError> {
        let summary = self
            .checkout
            .prepare(CheckoutSource::LandingPage {
                page: Box::new(page.clone()),
                quantity,
            })
            .await?;
        let order = self.checkout.place_order(&summary, form).await?;

        self.analytics.track(
            self.analytics
                .page_event(AnalyticsEventType::Lead, page)
                .with_metadata(json!({"source": "order", "orderId": order.id})),
        );
        Ok(order)
    }

    /// Testimonials to show: the page's own, or the built-in pool, in the
    /// page's fixed order.
    #[must_use]
    pub fn reviews(&self, page: &LandingPage) -> Vec<Review> {
        page.featured_reviews(&default_reviews())
    }
}
