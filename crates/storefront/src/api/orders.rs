//! Order endpoints.

use haat_core::{Order, OrderId, OrderRequest};
use secrecy::SecretString;
use serde_json::Value;
use tracing::instrument;

use super::{ApiClient, ApiError, extract_list, extract_object};

impl ApiClient {
    /// Place an order as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is rejected (there is no
    /// fallback to a guest order), or another error if the request fails.
    #[instrument(skip(self, token, request), fields(lines = request.items.len(), total = %request.total_amount))]
    pub async fn create_order(
        &self,
        token: &SecretString,
        request: &OrderRequest,
    ) -> Result<Order, ApiError> {
        let value: Value = self.post("api/orders", request, Some(token)).await?;
        extract_object(value, "order")
    }

    /// Place an order without an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(lines = request.items.len(), total = %request.total_amount))]
    pub async fn create_guest_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let value: Value = self.post("api/orders/guest", request, None).await?;
        extract_object(value, "order")
    }

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip_all)]
    pub async fn my_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let value: Value = self.get("api/orders/my", Some(token)).await?;
        extract_list(value, &["orders", "data"])
    }

    /// Public order lookup by id. Needs no token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or another error if the
    /// request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn track_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let path = format!("api/orders/track/{}", urlencoding::encode(id.as_str()));
        let value: Value = self.get(&path, None).await?;
        extract_object(value, "order")
    }
}
