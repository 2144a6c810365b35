//! Cache types for catalog responses.

use haat_core::{Article, Brand, Category, LandingPage, Product, ProductPage, Settings};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
    LandingPage(Box<LandingPage>),
    Articles(Vec<Article>),
    Article(Box<Article>),
    Settings(Settings),
}
