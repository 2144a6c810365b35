//! Haat Core - Shared domain types for the Haat storefront client.
//!
//! This crate provides the types used across all Haat components:
//! - `storefront` - Client library: API client, cart, checkout, landing funnel
//! - `cli` - Command-line front end over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. The few pieces of real client logic live here so they
//! can be tested without a runtime:
//!
//! - cart line merging, counting and totals ([`cart`])
//! - normalization of flat and populated cart lines ([`CartItem::normalize`])
//! - delivery area detection ([`DeliveryArea::detect`])
//! - order-id sanitization for tracking ([`OrderId::parse_tracking`])
//! - the seeded testimonial shuffle ([`select_reviews`])
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, contact values, statuses and API DTOs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
