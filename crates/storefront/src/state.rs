//! Client state container.
//!
//! Everything a front end needs is created once here and handed out by
//! reference; there are no globals.

use std::sync::Arc;
use std::time::Duration;

use haat_core::{Language, Order, UserInfo};
use tracing::instrument;

use crate::analytics::Analytics;
use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::content::Content;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::landing::LandingFunnel;
use crate::session::{SessionStore, SignupForm};
use crate::storage::{FileStorage, MemoryStorage, Storage};
use crate::tracking::OrderTracker;

/// How long [`AppState::shutdown`] waits for pending analytics.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Application state shared across the client.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the API
/// client, the session, the cart and the checkout flows.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
    checkout: Checkout,
    tracker: OrderTracker,
    analytics: Analytics,
    landing: LandingFunnel,
    content: Content,
}

impl AppState {
    /// Create the state with persistent storage in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or the HTTP client cannot be
    /// initialized.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let persistent = Arc::new(FileStorage::open(&config.data_dir)?);
        Self::with_storage(config, persistent, Arc::new(MemoryStorage::new()))
    }

    /// Create the state over the given persistent and session-scoped stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_storage(
        config: StorefrontConfig,
        persistent: Arc<dyn Storage>,
        session_scope: Arc<dyn Storage>,
    ) -> Result<Self, AppError> {
        let api = ApiClient::new(&config)?;
        let session = Arc::new(SessionStore::restore(Arc::clone(&persistent)));
        let cart = Arc::new(CartStore::new(
            api.clone(),
            Arc::clone(&session),
            persistent,
            config.guest_cart_policy,
        ));
        let checkout = Checkout::new(api.clone(), Arc::clone(&session), Arc::clone(&cart));
        let analytics = Analytics::new(api.clone(), Arc::clone(&session), session_scope);
        let landing = LandingFunnel::new(api.clone(), analytics.clone(), checkout.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                tracker: OrderTracker::new(api.clone()),
                content: Content::new(api.clone()),
                config,
                api,
                session,
                cart,
                checkout,
                analytics,
                landing,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the checkout flow.
    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }

    /// Get a reference to the order tracker.
    #[must_use]
    pub fn tracker(&self) -> &OrderTracker {
        &self.inner.tracker
    }

    /// Get a reference to the analytics sender.
    #[must_use]
    pub fn analytics(&self) -> &Analytics {
        &self.inner.analytics
    }

    /// Get a reference to the landing page funnel.
    #[must_use]
    pub fn landing(&self) -> &LandingFunnel {
        &self.inner.landing
    }

    /// Get a reference to articles and the contact form.
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.inner.content
    }

    /// Start-up work: tag Sentry with the stored user and load the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cart cannot be loaded.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), AppError> {
        if let Some(user) = self.session().current_user() {
            set_sentry_user(&user.id, Some(user.email.as_str()));
        }
        self.cart().load().await
    }

    /// Sign in, then load the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if sign-in fails. A failed cart load after a
    /// successful sign-in is reported and does not undo the sign-in.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo, AppError> {
        let user = self.session().login(self.api(), email, password).await?;
        self.after_sign_in(&user).await;
        Ok(user)
    }

    /// Create an account, then load the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or signup fails.
    pub async fn signup(&self, form: &SignupForm) -> Result<UserInfo, AppError> {
        let user = self.session().signup(self.api(), form).await?;
        self.after_sign_in(&user).await;
        Ok(user)
    }

    async fn after_sign_in(&self, user: &UserInfo) {
        set_sentry_user(&user.id, Some(user.email.as_str()));
        tracing::info!(user_id = %user.id, "Signed in");
        if let Err(e) = self.cart().load().await {
            e.report("Failed to load cart after sign-in");
        }
    }

    /// Sign out and fall back to the (empty) guest cart.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session cannot be removed.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.session().logout()?;
        clear_sentry_user();
        self.cart().load().await
    }

    /// Order history of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when signed out, or the API's error.
    pub async fn my_orders(&self) -> Result<Vec<Order>, AppError> {
        let token = self
            .session()
            .token()
            .ok_or_else(|| AppError::Unauthorized("sign in to see your orders".to_string()))?;
        Ok(self.api().my_orders(&token).await?)
    }

    /// Give background analytics sends a moment to finish before exit.
    pub async fn shutdown(&self) {
        self.analytics().flush(SHUTDOWN_GRACE).await;
    }

    /// Current language preference.
    #[must_use]
    pub fn language(&self) -> Language {
        self.session().language()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}
