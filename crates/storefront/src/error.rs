//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for every storefront operation.
//! Server-class failures are captured to Sentry when reported.

use haat_core::{EmailError, IdError, PhoneError, QuantityError};
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// REST API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Client storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// User input was rejected before any request was made.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout submission was not allowed in its current state.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation needs a signed-in user.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Whether this failure points at the backend or the local machine
    /// rather than at the user's request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_error(),
            Self::Storage(_) => true,
            Self::Validation(_)
            | Self::Config(_)
            | Self::Checkout(_)
            | Self::NotFound(_)
            | Self::Unauthorized(_) => false,
        }
    }

    /// Whether the requested resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Api(ApiError::NotFound(_)))
    }

    /// Log the error, capturing server errors to Sentry first.
    pub fn report(&self, context: &str) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "{context}"
            );
        } else {
            tracing::error!(error = %self, "{context}");
        }
    }
}

/// Client-side validation failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{0} is required")]
    Required(&'static str),

    #[error("invalid phone number: {0}")]
    Phone(#[from] PhoneError),

    #[error("invalid email address: {0}")]
    Email(#[from] EmailError),

    #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid order id: {0}")]
    OrderId(#[from] IdError),

    #[error("invalid quantity: {0}")]
    Quantity(#[from] QuantityError),

    /// Checkout was attempted with no items.
    #[error("there is nothing to order")]
    EmptyOrder,
}

/// Submission state violations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    /// A submission is already in flight.
    #[error("an order is already being submitted")]
    InProgress,

    /// The order was already placed; the form cannot be resubmitted.
    #[error("this order has already been placed")]
    AlreadyPlaced,
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "65f0c1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
