//! Delivery areas and their charges.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// City names that place an address inside the Dhaka delivery zone.
const INSIDE_MARKERS: &[&str] = &["dhaka", "ঢাকা"];

/// Which delivery tier an address falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryArea {
    InsideDhaka,
    OutsideDhaka,
}

impl DeliveryArea {
    /// Detect the delivery area from a free-text city.
    ///
    /// Any city mentioning Dhaka (in English or Bengali, any case) is inside;
    /// any other non-empty city is outside. An empty city detects nothing.
    ///
    /// ```
    /// use haat_core::DeliveryArea;
    ///
    /// assert_eq!(DeliveryArea::detect("North DHAKA"), Some(DeliveryArea::InsideDhaka));
    /// assert_eq!(DeliveryArea::detect("ঢাকা"), Some(DeliveryArea::InsideDhaka));
    /// assert_eq!(DeliveryArea::detect("Chattogram"), Some(DeliveryArea::OutsideDhaka));
    /// assert_eq!(DeliveryArea::detect("  "), None);
    /// ```
    #[must_use]
    pub fn detect(city: &str) -> Option<Self> {
        let city = city.trim();
        if city.is_empty() {
            return None;
        }

        let lower = city.to_lowercase();
        if INSIDE_MARKERS.iter().any(|marker| lower.contains(marker)) {
            Some(Self::InsideDhaka)
        } else {
            Some(Self::OutsideDhaka)
        }
    }
}

impl std::fmt::Display for DeliveryArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::InsideDhaka => "inside Dhaka",
            Self::OutsideDhaka => "outside Dhaka",
        })
    }
}

impl std::str::FromStr for DeliveryArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inside" | "inside_dhaka" => Ok(Self::InsideDhaka),
            "outside" | "outside_dhaka" => Ok(Self::OutsideDhaka),
            _ => Err(format!("invalid delivery area: {s} (expected inside or outside)")),
        }
    }
}

/// Delivery charge per area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRates {
    pub inside_dhaka: Decimal,
    pub outside_dhaka: Decimal,
}

impl DeliveryRates {
    /// Charge for the inside tier unless the backend says otherwise.
    pub const DEFAULT_INSIDE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
    /// Charge for the outside tier unless the backend says otherwise.
    pub const DEFAULT_OUTSIDE: Decimal = Decimal::from_parts(120, 0, 0, false, 0);

    /// Charge for an area.
    #[must_use]
    pub const fn charge(&self, area: DeliveryArea) -> Decimal {
        match area {
            DeliveryArea::InsideDhaka => self.inside_dhaka,
            DeliveryArea::OutsideDhaka => self.outside_dhaka,
        }
    }

    /// Replace defaults with backend-configured charges where present.
    #[must_use]
    pub fn with_overrides(self, inside: Option<Decimal>, outside: Option<Decimal>) -> Self {
        Self {
            inside_dhaka: inside.unwrap_or(self.inside_dhaka),
            outside_dhaka: outside.unwrap_or(self.outside_dhaka),
        }
    }
}

impl Default for DeliveryRates {
    fn default() -> Self {
        Self {
            inside_dhaka: Self::DEFAULT_INSIDE,
            outside_dhaka: Self::DEFAULT_OUTSIDE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_inside_variants() {
        for city in ["dhaka", "Dhaka", "DHAKA", "Mirpur, Dhaka", "ঢাকা", "উত্তর ঢাকা"] {
            assert_eq!(
                DeliveryArea::detect(city),
                Some(DeliveryArea::InsideDhaka),
                "{city}"
            );
        }
    }

    #[test]
    fn test_detect_outside() {
        assert_eq!(
            DeliveryArea::detect("Sylhet"),
            Some(DeliveryArea::OutsideDhaka)
        );
    }

    #[test]
    fn test_detect_empty_is_none() {
        assert_eq!(DeliveryArea::detect(""), None);
    }

    #[test]
    fn test_default_rates() {
        let rates = DeliveryRates::default();
        assert_eq!(rates.charge(DeliveryArea::InsideDhaka), Decimal::from(60));
        assert_eq!(rates.charge(DeliveryArea::OutsideDhaka), Decimal::from(120));
    }

    #[test]
    fn test_overrides_only_replace_present_values() {
        let rates = DeliveryRates::default().with_overrides(Some(Decimal::from(80)), None);
        assert_eq!(rates.charge(DeliveryArea::InsideDhaka), Decimal::from(80));
        assert_eq!(rates.charge(DeliveryArea::OutsideDhaka), Decimal::from(120));
    }
}
