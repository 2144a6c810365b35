//! Server cart endpoints (authenticated).
//!
//! Every mutation answers with the full cart, which replaces the client copy.

use haat_core::{CartItem, ProductId, Quantity, decode_cart_items};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Value;
use tracing::instrument;

use super::{ApiClient, ApiError, list_field};

const CART_KEYS: &[&str] = &["items", "cartItems"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartBody<'a> {
    product_id: &'a ProductId,
    quantity: Quantity,
}

/// Decode a cart response.
///
/// Every cart answer replaces the client copy, so a wrapper without a line
/// list is an error rather than an empty cart. Unreadable lines are skipped.
fn extract_cart(value: Value) -> Result<Vec<CartItem>, ApiError> {
    let Some(list) = list_field(value, CART_KEYS) else {
        tracing::warn!(expected = ?CART_KEYS, "Cart response has no recognized field");
        return Err(ApiError::Parse(serde_json::Error::custom(
            "cart response has no line list",
        )));
    };

    let lines: Vec<Value> = serde_json::from_value(list)?;
    let (items, skipped) = decode_cart_items(lines);
    for error in &skipped {
        tracing::warn!(error = %error, "Skipping unreadable cart line");
    }
    Ok(items)
}

impl ApiClient {
    /// Fetch the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip_all)]
    pub async fn cart(&self, token: &SecretString) -> Result<Vec<CartItem>, ApiError> {
        let value: Value = self.get("api/cart", Some(token)).await?;
        extract_cart(value)
    }

    /// Add units of a product to the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id, quantity = %quantity))]
    pub async fn add_to_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Vec<CartItem>, ApiError> {
        let body = AddToCartBody {
            product_id,
            quantity,
        };
        let value: Value = self.post("api/cart", &body, Some(token)).await?;
        extract_cart(value)
    }

    /// Remove a product's line from the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
    ) -> Result<Vec<CartItem>, ApiError> {
        let path = format!("api/cart/{}", urlencoding::encode(product_id.as_str()));
        let value: Value = self.delete(&path, Some(token)).await?;
        extract_cart(value)
    }

    /// Empty the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip_all)]
    pub async fn clear_cart(&self, token: &SecretString) -> Result<(), ApiError> {
        let _: serde::de::IgnoredAny = self.delete("api/cart", Some(token)).await?;
        Ok(())
    }
}
