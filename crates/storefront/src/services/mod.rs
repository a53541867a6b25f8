//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Per-session cart stores mirrored to Shopify
//! - `notify` - Toast notifications via the session and `HX-Trigger`

pub mod cart;
pub mod notify;

pub use cart::{CartRegistry, CartSnapshot, CartStore};
