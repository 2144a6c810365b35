//! Cart state container.
//!
//! Guests keep their cart in persistent storage under `guestCart`; signed-in
//! users use the server cart, and every server answer replaces the local copy
//! wholesale. New state is computed first and swapped in only after the API
//! call (or storage write) succeeds, so a failure never leaves a half-applied
//! cart.

use std::sync::Arc;

use haat_core::{
    CartItem, GuestCartItem, LineItem, Product, ProductId, Quantity, cart_count, cart_total,
    dedupe_guest_items, merge_guest_item, normalize_items,
};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::{AppError, add_breadcrumb};
use crate::session::SessionStore;
use crate::storage::{Storage, StorageExt, keys};

/// What happens to a guest cart when its owner signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuestCartPolicy {
    /// Drop the guest cart and show the server cart.
    #[default]
    Discard,
    /// Add every guest line to the server cart, then drop the guest cart.
    MergeIntoServer,
}

/// The shopper's cart.
pub struct CartStore {
    api: ApiClient,
    session: Arc<SessionStore>,
    storage: Arc<dyn Storage>,
    policy: GuestCartPolicy,
    items: RwLock<Vec<CartItem>>,
}

impl CartStore {
    /// Create an empty cart. Call [`CartStore::load`] to populate it.
    #[must_use]
    pub fn new(
        api: ApiClient,
        session: Arc<SessionStore>,
        storage: Arc<dyn Storage>,
        policy: GuestCartPolicy,
    ) -> Self {
        Self {
            api,
            session,
            storage,
            policy,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Current lines.
    pub async fn items(&self) -> Vec<CartItem> {
        self.items.read().await.clone()
    }

    /// Current lines in checkout shape.
    pub async fn line_items(&self) -> Vec<LineItem> {
        normalize_items(&self.items.read().await)
    }

    /// Total units in the cart.
    pub async fn count(&self) -> u32 {
        cart_count(&self.items.read().await)
    }

    /// Sum of `quantity × unit price`; lines without a price count as zero.
    pub async fn total(&self) -> Decimal {
        cart_total(&self.items.read().await)
    }

    /// Populate the cart for the current session.
    ///
    /// Signed in: applies the [`GuestCartPolicy`] to any leftover guest cart,
    /// then replaces local state with the server cart. Signed out: reads the
    /// guest cart from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cart cannot be fetched or the guest
    /// cart cannot be merged. Local state is unchanged on error; guest lines
    /// the server accepted before a merge failure are not retried.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), AppError> {
        let Some(token) = self.session.token() else {
            let guest = self.read_guest_cart();
            *self.items.write().await = guest.into_iter().map(CartItem::from).collect();
            return Ok(());
        };

        let guest = self.read_guest_cart();
        if !guest.is_empty() {
            match self.policy {
                GuestCartPolicy::Discard => {
                    tracing::warn!(
                        lines = guest.len(),
                        "Discarding guest cart after sign-in"
                    );
                }
                GuestCartPolicy::MergeIntoServer => {
                    // The stored guest cart only ever holds lines not yet merged.
                    for (merged, line) in guest.iter().enumerate() {
                        self.api
                            .add_to_cart(&token, &line.product, line.quantity)
                            .await
                            .inspect_err(|e| {
                                tracing::error!(
                                    product_id = %line.product,
                                    error = %e,
                                    "Failed to merge guest cart line"
                                );
                            })?;
                        self.storage
                            .set_json(keys::GUEST_CART, &guest[merged + 1..])?;
                    }
                    tracing::info!(lines = guest.len(), "Merged guest cart into server cart");
                }
            }
            self.storage.remove(keys::GUEST_CART)?;
        }

        let items = self.api.cart(&token).await?;
        *self.items.write().await = items;
        Ok(())
    }

    /// Add units of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the server call or the guest-cart write fails;
    /// the cart is unchanged in that case.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity = %quantity))]
    pub async fn add_to_cart(&self, product: &Product, quantity: Quantity) -> Result<(), AppError> {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));

        let result = match self.session.token() {
            Some(token) => match self.api.add_to_cart(&token, &product.id, quantity).await {
                Ok(items) => {
                    *self.items.write().await = items;
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
            None => {
                let incoming = GuestCartItem::from_product(product, quantity);
                self.update_guest(|items| merge_guest_item(items, incoming))
                    .await
            }
        };

        result.inspect_err(|e| e.report("Failed to add to cart"))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns an error if the server call or the guest-cart write fails;
    /// the cart is unchanged in that case.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<(), AppError> {
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", product_id.as_str())]));

        let result = match self.session.token() {
            Some(token) => match self.api.remove_from_cart(&token, product_id).await {
                Ok(items) => {
                    *self.items.write().await = items;
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
            None => {
                self.update_guest(|items| items.retain(|i| &i.product != product_id))
                    .await
            }
        };

        result.inspect_err(|e| e.report("Failed to remove from cart"))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the server call or the guest-cart removal fails;
    /// the cart is unchanged in that case.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), AppError> {
        add_breadcrumb("cart", "Cleared cart", None);

        let result = match self.session.token() {
            Some(token) => self.api.clear_cart(&token).await.map_err(AppError::from),
            None => self.storage.remove(keys::GUEST_CART).map_err(AppError::from),
        };

        match result {
            Ok(()) => {
                self.items.write().await.clear();
                Ok(())
            }
            Err(e) => {
                e.report("Failed to clear cart");
                Err(e)
            }
        }
    }

    /// Apply `change` to the guest cart, persist it, then swap it in.
    async fn update_guest(
        &self,
        change: impl FnOnce(&mut Vec<GuestCartItem>),
    ) -> Result<(), AppError> {
        let mut items = self.items.write().await;
        let mut guest: Vec<GuestCartItem> = items
            .iter()
            .filter_map(|item| match item {
                CartItem::Guest(line) => Some(line.clone()),
                CartItem::Populated(_) => None,
            })
            .collect();

        change(&mut guest);
        self.storage.set_json(keys::GUEST_CART, &guest)?;

        *items = guest.into_iter().map(CartItem::from).collect();
        Ok(())
    }

    /// Persisted guest lines; unreadable data counts as an empty cart.
    fn read_guest_cart(&self) -> Vec<GuestCartItem> {
        match self.storage.get_json::<Vec<GuestCartItem>>(keys::GUEST_CART) {
            Ok(items) => dedupe_guest_items(items.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable guest cart");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
