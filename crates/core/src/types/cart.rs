//! Cart lines and the normalized checkout line shape.
//!
//! Cart lines come in two shapes. The guest cart kept in client storage is
//! flat (`product` is an id, name and price are copied in), while the server
//! cart returns lines whose `product` is the populated product document.
//! [`CartItem`] models both, and [`CartItem::normalize`] is the single place
//! that turns either into a [`LineItem`].

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::id::ProductId;
use crate::types::price;
use crate::types::product::Product;

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Cart lines must hold at least one unit.
    #[error("quantity must be at least 1")]
    Zero,
}

/// Number of units on a cart line. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for `0`.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            Err(QuantityError::Zero)
        } else {
            Ok(Self(value))
        }
    }

    /// The number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Sum two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    /// Stored and server-returned quantities are clamped to at least one.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        Ok(Self(value.max(1)))
    }
}

/// A guest cart line as persisted in client storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestCartItem {
    pub product: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "price::amount")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub quantity: Quantity,
}

impl GuestCartItem {
    /// Build a guest line from a catalog product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        Self {
            product: product.id.clone(),
            name: product.name.clone(),
            price: product.unit_price(),
            image: product.primary_image().map(str::to_owned),
            quantity,
        }
    }
}

/// A server cart line with a populated product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedCartItem {
    pub product: Product,
    #[serde(default)]
    pub quantity: Quantity,
    /// Price captured on the line itself, when the backend stores one.
    #[serde(
        default,
        with = "price::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
}

/// Either cart line shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CartItem {
    Guest(GuestCartItem),
    Populated(PopulatedCartItem),
}

impl CartItem {
    /// The product this line is for.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        match self {
            Self::Guest(item) => &item.product,
            Self::Populated(item) => &item.product.id,
        }
    }

    /// Units on the line.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        match self {
            Self::Guest(item) => item.quantity,
            Self::Populated(item) => item.quantity,
        }
    }

    /// Unit price: line `price`, then product `price`, then `basePrice`, then zero.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        match self {
            Self::Guest(item) => item.price,
            Self::Populated(item) => item
                .price
                .filter(|p| !p.is_zero())
                .unwrap_or_else(|| item.product.unit_price()),
        }
    }

    /// `quantity × unit price`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity().get())
    }

    /// Convert to the uniform checkout shape.
    #[must_use]
    pub fn normalize(&self) -> LineItem {
        match self {
            Self::Guest(item) => LineItem {
                product: item.product.clone(),
                name: item.name.clone(),
                price: item.price,
                image: item.image.clone(),
                quantity: item.quantity,
            },
            Self::Populated(item) => LineItem {
                product: item.product.id.clone(),
                name: item.product.name.clone(),
                price: self.unit_price(),
                image: item.product.primary_image().map(str::to_owned),
                quantity: item.quantity,
            },
        }
    }
}

impl From<GuestCartItem> for CartItem {
    fn from(item: GuestCartItem) -> Self {
        Self::Guest(item)
    }
}

/// The normalized line sent with an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: ProductId,
    pub name: String,
    #[serde(with = "price::amount")]
    pub price: Decimal,
    pub image: Option<String>,
    pub quantity: Quantity,
}

impl LineItem {
    /// `quantity × price`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity.get())
    }
}

/// Merge a line into a guest cart.
///
/// A line for a product already in the cart adds to that line's quantity;
/// the cart never holds two lines for the same product.
pub fn merge_guest_item(items: &mut Vec<GuestCartItem>, incoming: GuestCartItem) {
    if let Some(existing) = items.iter_mut().find(|i| i.product == incoming.product) {
        existing.quantity = existing.quantity.saturating_add(incoming.quantity);
    } else {
        items.push(incoming);
    }
}

/// Collapse duplicate product lines left behind by older clients.
#[must_use]
pub fn dedupe_guest_items(items: Vec<GuestCartItem>) -> Vec<GuestCartItem> {
    let mut merged = Vec::with_capacity(items.len());
    for item in items {
        merge_guest_item(&mut merged, item);
    }
    merged
}

/// Total number of units in the cart.
#[must_use]
pub fn cart_count(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |acc, item| acc.saturating_add(item.quantity().get()))
}

/// Sum of `quantity × unit price` over the cart.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Normalize every line of a cart.
#[must_use]
pub fn normalize_items(items: &[CartItem]) -> Vec<LineItem> {
    items.iter().map(CartItem::normalize).collect()
}

/// Decode cart lines one at a time, keeping those that decode.
///
/// A server line whose product was deleted comes back with `product: null`
/// and matches neither shape; it is returned as an error next to the
/// readable lines instead of failing the whole cart.
#[must_use]
pub fn decode_cart_items(values: Vec<Value>) -> (Vec<CartItem>, Vec<serde_json::Error>) {
    let mut items = Vec::with_capacity(values.len());
    let mut skipped = Vec::new();
    for value in values {
        match serde_json::from_value(value) {
            Ok(item) => items.push(item),
            Err(e) => skipped.push(e),
        }
    }
    (items, skipped)
}

/// Deserialize a line list, dropping lines [`decode_cart_items`] rejects.
pub(crate) fn deserialize_readable_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<CartItem>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(decode_cart_items(values).0)
}

/// Sum of line totals.
#[must_use]
pub fn subtotal(items: &[LineItem]) -> Decimal {
    items.iter().map(LineItem::total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn guest(id: &str, price: i64, quantity: u32) -> GuestCartItem {
        GuestCartItem {
            product: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::from(price),
            image: None,
            quantity: Quantity::new(quantity).unwrap(),
        }
    }

    #[test]
    fn test_quantity_rejects_zero() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert_eq!(Quantity::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_quantity_deserialize_clamps_zero() {
        let q: Quantity = serde_json::from_str("0").unwrap();
        assert_eq!(q, Quantity::ONE);
    }

    #[test]
    fn test_merge_same_product_sums_quantity() {
        let mut items = Vec::new();
        merge_guest_item(&mut items, guest("p1", 10, 2));
        merge_guest_item(&mut items, guest("p1", 10, 3));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.get(), 5);
    }

    #[test]
    fn test_merge_different_products_appends() {
        let mut items = vec![guest("p1", 10, 1)];
        merge_guest_item(&mut items, guest("p2", 5, 1));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_dedupe_collapses_duplicates() {
        let items = dedupe_guest_items(vec![
            guest("p1", 10, 1),
            guest("p2", 5, 1),
            guest("p1", 10, 4),
        ]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity.get(), 5);
    }

    #[test]
    fn test_cart_total_and_count() {
        let items: Vec<CartItem> = vec![guest("p1", 10, 2).into(), guest("p2", 5, 3).into()];
        assert_eq!(cart_total(&items), Decimal::from(35));
        assert_eq!(cart_count(&items), 5);
    }

    #[test]
    fn test_missing_price_contributes_zero() {
        let items: Vec<CartItem> = serde_json::from_value(json!([
            {"product": "p1", "name": "A", "price": 10, "quantity": 2},
            {"product": "p2", "name": "B", "quantity": 4}
        ]))
        .unwrap();
        assert_eq!(cart_total(&items), Decimal::from(20));
    }

    #[test]
    fn test_untagged_picks_shape_from_product_field() {
        let items: Vec<CartItem> = serde_json::from_value(json!([
            {"product": "p1", "name": "Flat", "price": 10, "quantity": 1},
            {"product": {"_id": "p2", "name": "Nested", "basePrice": 20}, "quantity": 2}
        ]))
        .unwrap();
        assert!(matches!(items[0], CartItem::Guest(_)));
        assert!(matches!(items[1], CartItem::Populated(_)));
        assert_eq!(cart_total(&items), Decimal::from(50));
    }

    #[test]
    fn test_populated_line_price_beats_product_price() {
        let item: CartItem = serde_json::from_value(json!({
            "product": {"_id": "p1", "name": "Nested", "basePrice": 20},
            "quantity": 1,
            "price": 15
        }))
        .unwrap();
        assert_eq!(item.unit_price(), Decimal::from(15));
    }

    #[test]
    fn test_normalize_both_shapes_match() {
        let flat: CartItem = serde_json::from_value(json!({
            "product": "p1", "name": "Mango", "price": 120,
            "image": "/img/mango.jpg", "quantity": 2
        }))
        .unwrap();
        let populated: CartItem = serde_json::from_value(json!({
            "product": {
                "_id": "p1", "name": "Mango", "basePrice": "120",
                "images": ["/img/mango.jpg"]
            },
            "quantity": 2
        }))
        .unwrap();

        assert_eq!(flat.normalize(), populated.normalize());
        assert_eq!(
            serde_json::to_value(flat.normalize()).unwrap(),
            json!({
                "product": "p1", "name": "Mango", "price": 120,
                "image": "/img/mango.jpg", "quantity": 2
            })
        );
    }

    #[test]
    fn test_decode_skips_lines_without_product() {
        let (items, skipped) = decode_cart_items(vec![
            json!({"product": {"_id": "p1", "name": "Mango", "basePrice": 120}, "quantity": 2}),
            json!({"product": null, "quantity": 2}),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(cart_total(&items), Decimal::from(240));
    }

    #[test]
    fn test_subtotal_of_normalized_lines() {
        let items: Vec<CartItem> = vec![guest("p1", 10, 2).into(), guest("p2", 5, 3).into()];
        assert_eq!(subtotal(&normalize_items(&items)), Decimal::from(35));
    }
}
