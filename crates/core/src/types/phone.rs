//! Mobile phone numbers for checkout and lead forms.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input has no digits at all.
    #[error("phone number cannot be empty")]
    Empty,
    /// Something other than digits, spaces, dashes or a leading `+`.
    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// Not an 11-digit `01XXXXXXXXX` mobile number.
    #[error("phone number must be an 11-digit mobile number starting with 01")]
    InvalidFormat,
}

/// A Bangladeshi mobile number in local 11-digit form (`01XXXXXXXXX`).
///
/// Accepts the common ways customers type it: with a `+88` or `88` country
/// prefix, with spaces or dashes, and with Bengali digits.
///
/// ```
/// use haat_core::Phone;
///
/// let phone = Phone::parse("+880 1712-345678").unwrap();
/// assert_eq!(phone.as_str(), "01712345678");
/// assert!(Phone::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of digits in the local form.
    pub const LOCAL_DIGITS: usize = 11;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other than
    /// digits, spaces, dashes and a leading `+`, or does not normalize to an
    /// 11-digit number starting with `01`.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' => {}
                _ => match bengali_digit(c) {
                    Some(d) => digits.push(d),
                    None => return Err(PhoneError::InvalidCharacter(c)),
                },
            }
        }

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        let local = digits.strip_prefix("88").unwrap_or(&digits);

        if local.len() != Self::LOCAL_DIGITS || !local.starts_with("01") {
            return Err(PhoneError::InvalidFormat);
        }

        Ok(Self(local.to_owned()))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Map a Bengali digit (`০`..=`৯`) to its ASCII counterpart.
fn bengali_digit(c: char) -> Option<char> {
    let offset = u32::from(c).checked_sub(0x09E6)?;
    if offset > 9 {
        return None;
    }
    char::from_digit(offset, 10)
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
