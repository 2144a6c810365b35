//! Checkout: turn a cart, a buy-now product or a landing page into an order.
//!
//! All three sources are normalized into [`LineItem`]s first, so totals and
//! the order payload are computed one way regardless of where the items came
//! from.

use std::sync::Arc;

use haat_core::{
    DeliveryArea, DeliveryRates, GuestCartItem, LandingPage, LandingPageId, LineItem, Order,
    OrderRequest, PaymentMethod, Phone, ProductId, Quantity, ShippingAddress, subtotal,
};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::error::{AppError, CheckoutError, ValidationError, add_breadcrumb};
use crate::session::SessionStore;

/// Where the items being checked out come from.
#[derive(Debug, Clone)]
pub enum CheckoutSource {
    /// A single product bought directly from its page.
    BuyNow {
        product_id: ProductId,
        quantity: Quantity,
    },
    /// Everything in the cart.
    Cart,
    /// A landing page's product at the campaign price.
    LandingPage {
        page: Box<LandingPage>,
        quantity: Quantity,
    },
}

/// Which kind of source a summary was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    BuyNow,
    Cart,
    LandingPage,
}

/// Normalized items about to be ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    pub source: SourceKind,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub landing_page: Option<LandingPageId>,
}

impl CheckoutSummary {
    /// Build a summary from already-normalized items.
    #[must_use]
    pub fn new(source: SourceKind, items: Vec<LineItem>) -> Self {
        let subtotal = subtotal(&items);
        Self {
            source,
            items,
            subtotal,
            landing_page: None,
        }
    }

    /// Price breakdown for a delivery area.
    #[must_use]
    pub fn quote(&self, area: DeliveryArea, rates: &DeliveryRates) -> Quote {
        let delivery_charge = rates.charge(area);
        Quote {
            area,
            subtotal: self.subtotal,
            delivery_charge,
            total: self.subtotal + delivery_charge,
        }
    }
}

/// Subtotal, delivery charge and grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub area: DeliveryArea,
    pub subtotal: Decimal,
    pub delivery_charge: Decimal,
    pub total: Decimal,
}

/// Shipping form input.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub note: Option<String>,
    pub payment_method: PaymentMethod,
    /// Explicit delivery area; detected from the city when unset.
    pub delivery_area: Option<DeliveryArea>,
}

impl CheckoutForm {
    /// Check required fields and the phone number.
    ///
    /// # Errors
    ///
    /// Returns the first missing field or an invalid phone number.
    pub fn validate(&self) -> Result<ShippingAddress, ValidationError> {
        let full_name = required(&self.full_name, "full name")?;
        let phone = required(&self.phone, "phone")?;
        let address = required(&self.address, "address")?;
        let city = required(&self.city, "city")?;
        let phone = Phone::parse(phone)?;

        Ok(ShippingAddress {
            full_name: full_name.to_owned(),
            phone: phone.into_inner(),
            address: address.to_owned(),
            city: city.to_owned(),
            note: self
                .note
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_owned),
        })
    }

    /// The delivery area the order will be charged for.
    #[must_use]
    pub fn delivery_area(&self) -> Option<DeliveryArea> {
        self.delivery_area
            .or_else(|| DeliveryArea::detect(&self.city))
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(value)
    }
}

// =============================================================================
// Submission state
// =============================================================================

/// State of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState<T> {
    Idle,
    Submitting,
    Succeeded(T),
    Failed(String),
}

/// Guards a form against double submission.
///
/// `Idle → Submitting → Succeeded | Failed`. A failed submission may be
/// retried; a successful one is final.
#[derive(Debug, Clone)]
pub struct Submission<T> {
    state: SubmissionState<T>,
}

impl<T> Default for Submission<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Submission<T> {
    /// A fresh, idle submission.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SubmissionState<T> {
        &self.state
    }

    /// Enter `Submitting`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InProgress` while submitting and
    /// `CheckoutError::AlreadyPlaced` after success.
    pub fn begin(&mut self) -> Result<(), CheckoutError> {
        match self.state {
            SubmissionState::Submitting => Err(CheckoutError::InProgress),
            SubmissionState::Succeeded(_) => Err(CheckoutError::AlreadyPlaced),
            SubmissionState::Idle | SubmissionState::Failed(_) => {
                self.state = SubmissionState::Submitting;
                Ok(())
            }
        }
    }

    /// Record the outcome of the attempt started by [`Submission::begin`].
    pub fn finish<E: std::fmt::Display>(&mut self, outcome: &Result<T, E>)
    where
        T: Clone,
    {
        self.state = match outcome {
            Ok(value) => SubmissionState::Succeeded(value.clone()),
            Err(e) => SubmissionState::Failed(e.to_string()),
        };
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Builds checkout summaries and places orders.
#[derive(Clone)]
pub struct Checkout {
    api: ApiClient,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
}

impl Checkout {
    #[must_use]
    pub const fn new(api: ApiClient, session: Arc<SessionStore>, cart: Arc<CartStore>) -> Self {
        Self { api, session, cart }
    }

    /// Delivery rates from the backend settings, or the defaults when the
    /// settings cannot be loaded.
    pub async fn delivery_rates(&self) -> DeliveryRates {
        match self.api.settings().await {
            Ok(settings) => settings.delivery_rates(),
            Err(e) => {
                tracing::warn!(error = %e, "Using default delivery rates");
                DeliveryRates::default()
            }
        }
    }

    /// Normalize a source into a summary.
    ///
    /// # Errors
    ///
    /// Returns an error if a buy-now product cannot be fetched or a landing
    /// page has no product.
    #[instrument(skip(self, source))]
    pub async fn prepare(&self, source: CheckoutSource) -> Result<CheckoutSummary, AppError> {
        match source {
            CheckoutSource::Cart => Ok(CheckoutSummary::new(
                SourceKind::Cart,
                self.cart.line_items().await,
            )),
            CheckoutSource::BuyNow {
                product_id,
                quantity,
            } => {
                let product = self.api.product(&product_id).await?;
                let line = GuestCartItem::from_product(&product, quantity);
                Ok(CheckoutSummary::new(
                    SourceKind::BuyNow,
                    vec![haat_core::CartItem::from(line).normalize()],
                ))
            }
            CheckoutSource::LandingPage { page, quantity } => {
                let reference = page.product.as_ref().ok_or_else(|| {
                    AppError::NotFound(format!("product for landing page {}", page.slug))
                })?;
                let product = match reference.populated() {
                    Some(product) => product.clone(),
                    None => self.api.product(reference.id()).await?,
                };

                let mut line = GuestCartItem::from_product(&product, quantity);
                line.price = page.offer_price.unwrap_or(line.price);

                let mut summary = CheckoutSummary::new(
                    SourceKind::LandingPage,
                    vec![haat_core::CartItem::from(line).normalize()],
                );
                summary.landing_page = Some(page.id.clone());
                Ok(summary)
            }
        }
    }

    /// Validate the form and place the order.
    ///
    /// Signed-in users order through the authenticated endpoint with their
    /// token; everyone else through the guest endpoint. A rejected token is
    /// an error, not a reason to retry as a guest. Cart orders clear the cart
    /// on success.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty order or invalid form, or the
    /// API's error if the order is rejected.
    #[instrument(skip_all, fields(source = ?summary.source, lines = summary.items.len()))]
    pub async fn place_order(
        &self,
        summary: &CheckoutSummary,
        form: &CheckoutForm,
    ) -> Result<Order, AppError> {
        if summary.items.is_empty() {
            return Err(ValidationError::EmptyOrder.into());
        }
        let shipping_address = form.validate()?;
        let area = form
            .delivery_area()
            .ok_or(ValidationError::Required("city"))?;
        let quote = summary.quote(area, &self.delivery_rates().await);

        let request = OrderRequest {
            items: summary.items.clone(),
            shipping_address,
            delivery_charge: quote.delivery_charge,
            payment_method: form.payment_method,
            total_amount: quote.total,
            landing_page: summary.landing_page.clone(),
            session_id: Some(self.session.analytics_session_id()),
        };

        add_breadcrumb("checkout", "Placing order", None);

        let order = match self.session.token() {
            Some(token) => self.api.create_order(&token, &request).await?,
            None => self.api.create_guest_order(&request).await?,
        };

        tracing::info!(order_id = %order.id, total = %quote.total, "Order placed");

        if summary.source == SourceKind::Cart
            && let Err(e) = self.cart.clear_cart().await
        {
            e.report("Failed to clear cart after order");
        }

        Ok(order)
    }

    /// Place an order through a [`Submission`] guard.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the submission is already in flight or
    /// done, otherwise whatever [`Checkout::place_order`] returns.
    pub async fn submit(
        &self,
        submission: &mut Submission<Order>,
        summary: &CheckoutSummary,
        form: &CheckoutForm,
    ) -> Result<Order, AppError> {
        submission.begin()?;
        let outcome = self.place_order(summary, form).await;
        submission.finish(&outcome);
        outcome
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout").finish_non_exhaustive()
    }
}
