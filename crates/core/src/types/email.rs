//! Email addresses typed into the signup, login and contact forms.

use serde::{Deserialize, Serialize};

/// Why a typed email address was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must look like name@example.com")]
    Malformed,
    /// `rahim@gmail` and similar.
    #[error("email domain must contain a dot")]
    DomainWithoutDot,
}

/// A normalized email address.
///
/// [`Email::parse`] trims and lowercases what the customer typed, so the
/// same mailbox always reaches the API in the same spelling. Addresses the
/// backend returns are taken as they are on deserialization.
///
/// ```
/// use haat_core::{Email, EmailError};
///
/// assert_eq!(Email::parse(" Rahim@Shop.COM.bd ").unwrap().as_str(), "rahim@shop.com.bd");
/// assert_eq!(Email::parse("rahim@gmail"), Err(EmailError::DomainWithoutDot));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Normalize and validate a typed address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] naming the first rule the input breaks.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }
        if normalized.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        // Split on the last '@' so quoted local parts keep theirs.
        match normalized.rsplit_once('@') {
            Some((mailbox, host)) if !mailbox.is_empty() && !host.is_empty() => {
                if host.contains('.') {
                    Ok(Self(normalized))
                } else {
                    Err(EmailError::DomainWithoutDot)
                }
            }
            _ => Err(EmailError::Malformed),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
