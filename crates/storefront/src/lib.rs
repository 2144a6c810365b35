//! Haat storefront client library.
//!
//! Talks to the Haat REST API and keeps the client-side state a shopper
//! accumulates: the signed-in session, the cart, checkout submissions and
//! the landing-page funnel. All business rules that matter (pricing of
//! record, order processing, fraud scoring) stay on the server.
//!
//! Start with [`state::AppState`], which wires every component together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod content;
pub mod error;
pub mod landing;
pub mod session;
pub mod state;
pub mod storage;
pub mod tracking;

pub use error::{AppError, Result};
pub use state::AppState;
