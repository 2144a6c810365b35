//! Blog/news reading and the contact form.

use haat_core::{Article, ContactMessage, Email, Phone};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::{AppError, ValidationError};

/// Contact form input.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// Check the form before it is sent.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or an invalid email or phone number.
    pub fn validate(&self) -> Result<ContactMessage, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }
        let email = Email::parse(&self.email)?;
        let message = self.message.trim();
        if message.is_empty() {
            return Err(ValidationError::Required("message"));
        }
        let phone = match self.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => Some(Phone::parse(phone)?.into_inner()),
            _ => None,
        };

        Ok(ContactMessage {
            name: name.to_owned(),
            email,
            phone,
            subject: self
                .subject
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            message: message.to_owned(),
        })
    }
}

/// Articles and contact messages.
#[derive(Debug, Clone)]
pub struct Content {
    api: ApiClient,
}

impl Content {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Published articles, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn articles(&self) -> Result<Vec<Article>, AppError> {
        let mut articles = self.api.articles().await?;
        articles.sort_by(|a, b| b.display_date().cmp(&a.display_date()));
        Ok(articles)
    }

    /// One article by slug.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown slugs, or another error if the
    /// request fails.
    pub async fn article(&self, slug: &str) -> Result<Article, AppError> {
        Ok(self.api.article(slug.trim()).await?)
    }

    /// Validate and send a contact message.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the API's error if the
    /// message is rejected.
    #[instrument(skip_all)]
    pub async fn send_contact(&self, form: &ContactForm) -> Result<(), AppError> {
        let message = form.validate()?;
        self.api.send_contact(&message).await?;
        tracing::info!("Contact message sent");
        Ok(())
    }
}
