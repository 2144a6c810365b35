//! Subcommand implementations.
//!
//! Each module prints its results to stdout; progress and failures go
//! through `tracing` like the rest of the client.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod content;
pub mod landing;
pub mod orders;

use haat_core::{LineItem, Price};
use rust_decimal::Decimal;

/// Format an amount in taka.
pub(crate) fn taka(amount: Decimal) -> String {
    Price::bdt(amount).display()
}

/// Print normalized lines with their totals.
#[allow(clippy::print_stdout)]
pub(crate) fn print_lines(items: &[LineItem]) {
    for item in items {
        println!(
            "  {:<24} {:>3} x {:>10} = {:>10}  ({})",
            item.name,
            item.quantity,
            taka(item.price),
            taka(item.total()),
            item.product
        );
    }
}
