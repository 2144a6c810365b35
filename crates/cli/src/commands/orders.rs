//! Checkout, tracking and order history commands.

#![allow(clippy::print_stdout)]

use haat_core::{Order, ProductId, Quantity};
use haat_storefront::AppState;
use haat_storefront::checkout::{CheckoutForm, CheckoutSource, CheckoutSummary, Submission};
use haat_storefront::tracking::tracking_url;

use super::{print_lines, taka};

/// Check out the cart, or a single product with `--buy-now`.
pub async fn checkout(
    state: &AppState,
    buy_now: Option<&str>,
    quantity: u32,
    form: &CheckoutForm,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = match buy_now {
        Some(id) => CheckoutSource::BuyNow {
            product_id: ProductId::new(id.trim()),
            quantity: Quantity::new(quantity)?,
        },
        None => CheckoutSource::Cart,
    };

    let summary = state.checkout().prepare(source).await?;
    print_quote(state, &summary, form).await;

    let mut submission = Submission::new();
    let order = state.checkout().submit(&mut submission, &summary, form).await?;
    print_confirmation(state, &order);
    Ok(())
}

/// Print the lines and the quoted delivery charge before ordering.
pub(crate) async fn print_quote(state: &AppState, summary: &CheckoutSummary, form: &CheckoutForm) {
    println!("Order summary:");
    print_lines(&summary.items);
    println!("Subtotal: {}", taka(summary.subtotal));

    if let Some(area) = form.delivery_area() {
        let quote = summary.quote(area, &state.checkout().delivery_rates().await);
        println!("Delivery ({area}): {}", taka(quote.delivery_charge));
        println!("Total: {}", taka(quote.total));
    }
}

pub(crate) fn print_confirmation(state: &AppState, order: &Order) {
    println!("\nOrder placed: #{}", order.id);
    println!("Status: {}", order.status);
    println!("Payment: {}", order.payment_method);
    println!("Total: {}", taka(order.total_amount));
    println!("Track it at {}", tracking_url(&state.config().site_url, &order.id));
}

/// Look up an order by id.
pub async fn track(state: &AppState, order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let order = state.tracker().track(order_id).await?;

    println!("Order #{}", order.id);
    println!("Status: {}", order.status);
    if let Some(placed) = order.created_at {
        println!("Placed: {}", placed.format("%Y-%m-%d %H:%M"));
    }
    println!(
        "Ship to: {}, {}",
        order.shipping_address.full_name, order.shipping_address.city
    );
    println!("Items: {}", order.unit_count());
    println!("Delivery: {}", taka(order.delivery_charge));
    println!("Total: {}", taka(order.total_amount));
    Ok(())
}

/// List the signed-in user's orders.
pub async fn history(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let orders = state.my_orders().await?;
    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    for order in &orders {
        let placed = order
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "#{:<26} {:<10} {:<12} {:>10}",
            order.id,
            placed,
            order.status.to_string(),
            taka(order.total_amount)
        );
    }
    Ok(())
}
