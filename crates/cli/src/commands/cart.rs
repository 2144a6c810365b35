//! Cart commands.

#![allow(clippy::print_stdout)]

use haat_core::{ProductId, Quantity};
use haat_storefront::AppState;

use super::{print_lines, taka};

/// Show the cart with its total.
pub async fn show(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let cart = state.cart();
    let items = cart.line_items().await;
    if items.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    let owner = if state.session().is_authenticated() {
        "account"
    } else {
        "guest"
    };
    println!("Cart ({owner}, {} items):", cart.count().await);
    print_lines(&items);
    println!("Total: {}", taka(cart.total().await));
    Ok(())
}

/// Add a product, merging with an existing line for the same product.
pub async fn add(
    state: &AppState,
    product_id: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let quantity = Quantity::new(quantity)?;
    let product = state.api().product(&ProductId::new(product_id.trim())).await?;
    state.cart().add_to_cart(&product, quantity).await?;

    println!(
        "Added {quantity} x {} ({} items in cart)",
        product.name,
        state.cart().count().await
    );
    Ok(())
}

/// Remove every unit of a product.
pub async fn remove(state: &AppState, product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    state
        .cart()
        .remove_from_cart(&ProductId::new(product_id.trim()))
        .await?;
    println!("Removed. {} items left in cart.", state.cart().count().await);
    Ok(())
}

/// Empty the cart.
pub async fn clear(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    state.cart().clear_cart().await?;
    println!("Cart cleared.");
    Ok(())
}
