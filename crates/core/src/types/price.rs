//! Prices and lenient amount parsing.
//!
//! The backend is loose about numbers: a price may arrive as a JSON number,
//! a numeric string, `null`, or not at all. Every amount the client reads
//! goes through [`parse_amount`], which follows `Number(x) || 0` semantics so
//! a malformed price contributes zero to a total instead of failing it.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (taka, not poisha).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub fn bdt(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }

    /// Format for display, e.g. `৳1,250` or `৳99.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let amount = self.amount.round_dp(2).normalize();
        let sign = if amount.is_sign_negative() { "-" } else { "" };
        let abs = amount.abs();
        let whole = abs.trunc().to_string();
        let fraction = abs.fract();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        if fraction.is_zero() {
            format!("{sign}{}{grouped}", self.currency_code.symbol())
        } else {
            let cents = (fraction * Decimal::ONE_HUNDRED)
                .round()
                .to_u32()
                .unwrap_or_default();
            format!("{sign}{}{grouped}.{cents:02}", self.currency_code.symbol())
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes the storefront prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BDT,
    USD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BDT => "৳",
            Self::USD => "$",
        }
    }
}

/// Interpret a JSON value as an amount, falling back to zero.
///
/// Numbers and numeric strings parse. `null`, booleans, empty strings,
/// arrays, objects and unparseable text all yield `0`.
#[must_use]
pub fn parse_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => Decimal::ZERO,
    }
}

fn parse_decimal(s: &str) -> Decimal {
    if s.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

/// Serde adapter for amounts: lenient on the way in, JSON numbers on the way out.
///
/// ```rust
/// use rust_decimal::Decimal;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(default, with = "haat_core::price::amount")]
///     price: Decimal,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"price": "12.5"}"#).unwrap();
/// assert_eq!(row.price, Decimal::new(125, 1));
/// let row: Row = serde_json::from_str(r#"{"price": null}"#).unwrap();
/// assert_eq!(row.price, Decimal::ZERO);
/// ```
pub mod amount {
    use super::{Decimal, Deserialize, Deserializer, Serializer, ToPrimitive, Value, parse_amount};

    /// Serialize as an integer when whole, otherwise as a float.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        if amount.fract().is_zero()
            && let Some(whole) = amount.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        serializer.serialize_f64(amount.to_f64().unwrap_or_default())
    }

    /// Deserialize any JSON value with `Number(x) || 0` semantics.
    ///
    /// # Errors
    ///
    /// Only fails if the input is not valid JSON.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(parse_amount(&value))
    }
}

/// Like [`amount`], but keeps "absent or zero" distinct as `None`.
///
/// The `price || basePrice` fallback chain treats a zero price as missing,
/// so zero deserializes to `None` here.
pub mod optional_amount {
    use super::{Decimal, Deserialize, Deserializer, Serializer, Value, parse_amount};

    /// Serialize `Some` as a number and `None` as `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        amount: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match amount {
            Some(amount) => super::amount::serialize(amount, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize leniently; zero and unparseable values become `None`.
    ///
    /// # Errors
    ///
    /// Only fails if the input is not valid JSON.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let amount = parse_amount(&value);
        Ok((!amount.is_zero()).then_some(amount))
    }
}
