//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out Mongo-style string identifiers (`_id`). Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing IDs
//! from different entity types.

/// Errors that can occur when parsing an identifier from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// Nothing left after trimming.
    #[error("id cannot be empty")]
    Empty,
    /// The id contains characters that cannot appear in a backend id.
    #[error("id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use haat_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("64f1a2b3c4d5e6f7a8b9c0d1");
/// let order_id = OrderId::new("64f1a2b3c4d5e6f7a8b9c0d1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(BrandId);
define_id!(OrderId);
define_id!(LandingPageId);
define_id!(ArticleId);

impl OrderId {
    /// Parse an order id typed by a customer into a tracking lookup id.
    ///
    /// Surrounding whitespace and a single leading `#` are removed, so
    /// `"#64f1a2b3c4d5e6f7"` and `"64f1a2b3c4d5e6f7"` resolve to the same id.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Empty`] when nothing remains, or
    /// [`IdError::InvalidCharacter`] for whitespace, `/`, `?` or `#` inside
    /// the id.
    pub fn parse_tracking(input: &str) -> Result<Self, IdError> {
        let trimmed = input.trim();
        let id = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();

        if id.is_empty() {
            return Err(IdError::Empty);
        }

        if let Some(c) = id
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
        {
            return Err(IdError::InvalidCharacter(c));
        }

        Ok(Self(id.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_strips_leading_hash() {
        let with_hash = OrderId::parse_tracking("#64f1a2b3c4d5e6f7").unwrap();
        let without = OrderId::parse_tracking("64f1a2b3c4d5e6f7").unwrap();
        assert_eq!(with_hash, without);
        assert_eq!(with_hash.as_str(), "64f1a2b3c4d5e6f7");
    }

    #[test]
    fn test_tracking_trims_whitespace() {
        let id = OrderId::parse_tracking("  # 64f1a2b3  ").unwrap();
        assert_eq!(id.as_str(), "64f1a2b3");
    }

    #[test]
    fn test_tracking_only_strips_one_hash() {
        assert_eq!(
            OrderId::parse_tracking("##abc"),
            Err(IdError::InvalidCharacter('#'))
        );
    }

    #[test]
    fn test_tracking_rejects_empty() {
        assert_eq!(OrderId::parse_tracking(""), Err(IdError::Empty));
        assert_eq!(OrderId::parse_tracking("  #  "), Err(IdError::Empty));
    }

    #[test]
    fn test_tracking_rejects_path_characters() {
        assert_eq!(
            OrderId::parse_tracking("abc/../def"),
            Err(IdError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = ProductId::new("p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
        let parsed: ProductId = serde_json::from_str("\"p1\"").unwrap();
        assert_eq!(parsed, id);
    }
}
