//! Core types for Haat.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the DTOs mirrored from the storefront REST API.

pub mod analytics;
pub mod cart;
pub mod content;
pub mod delivery;
pub mod email;
pub mod id;
pub mod inquiry;
pub mod landing;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;
pub mod status;
pub mod user;

pub use analytics::AnalyticsEvent;
pub use cart::{
    CartItem, GuestCartItem, LineItem, PopulatedCartItem, Quantity, QuantityError, cart_count,
    cart_total, decode_cart_items, dedupe_guest_items, merge_guest_item, normalize_items, subtotal,
};
pub use content::{Article, Settings};
pub use delivery::{DeliveryArea, DeliveryRates};
pub use email::{Email, EmailError};
pub use id::*;
pub use inquiry::{ContactMessage, LeadRequest};
pub use landing::{Feature, LandingPage, ProductRef, REVIEWS_SHOWN, Review, select_reviews};
pub use order::{Order, OrderRequest, ShippingAddress};
pub use phone::{Phone, PhoneError};
pub use price::{CurrencyCode, Price};
pub use product::{Brand, BrandRef, Category, CategoryRef, Product, ProductPage};
pub use status::*;
pub use user::{LoginRequest, SignupRequest, UserInfo};
