//! Catalog browsing commands.

#![allow(clippy::print_stdout)]

use haat_core::{BrandId, CategoryId, ProductId};
use haat_storefront::AppState;
use haat_storefront::api::ProductQuery;

use super::taka;

/// List a page of products.
pub async fn products(
    state: &AppState,
    keyword: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    page: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = ProductQuery {
        keyword,
        category: category.map(CategoryId::new),
        brand: brand.map(BrandId::new),
        page,
    };
    let result = state.api().products(&query).await?;

    if result.products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &result.products {
        let availability = if product.is_purchasable() {
            ""
        } else {
            "  [out of stock]"
        };
        println!(
            "{:<26} {:<32} {:>10}{availability}",
            product.id,
            product.name,
            taka(product.unit_price())
        );
    }
    println!("\nPage {} of {}", result.page, result.pages.max(1));
    if result.has_next() {
        println!("More: --page {}", result.page + 1);
    }
    Ok(())
}

/// Show one product.
pub async fn product(state: &AppState, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let product = state.api().product(&ProductId::new(id.trim())).await?;

    println!("{}", product.name);
    println!("Price: {}", taka(product.unit_price()));
    if product.base_price > product.unit_price() {
        println!("Regular price: {}", taka(product.base_price));
    }
    if let Some(stock) = product.stock {
        println!("In stock: {stock}");
    }
    if let Some(image) = product.primary_image() {
        println!("Image: {image}");
    }
    if let Some(description) = &product.description {
        println!("\n{description}");
    }
    Ok(())
}

/// List categories.
pub async fn categories(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    for category in state.api().categories().await? {
        println!("{:<26} {}", category.id, category.name);
    }
    Ok(())
}

/// List brands.
pub async fn brands(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    for brand in state.api().brands().await? {
        println!("{:<26} {}", brand.id, brand.name);
    }
    Ok(())
}
