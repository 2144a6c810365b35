//! Orders: the checkout payload and the backend's order document.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::cart::{CartItem, LineItem};
use crate::types::id::{LandingPageId, OrderId};
use crate::types::price;
use crate::types::status::{OrderStatus, PaymentMethod};

/// Where an order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(alias = "name")]
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of an order submission (guest or authenticated).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    #[serde(with = "price::amount")]
    pub delivery_charge: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(with = "price::amount")]
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<LandingPageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// An order as the backend returns it.
///
/// Items may come back flat or with populated products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    /// Lines whose product no longer exists are left out.
    #[serde(
        default,
        alias = "orderItems",
        deserialize_with = "crate::types::cart::deserialize_readable_items"
    )]
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default, with = "price::amount")]
    pub delivery_charge: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, with = "price::amount")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    /// Risk score computed by the backend; display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        crate::types::cart::cart_count(&self.items)
    }
}
