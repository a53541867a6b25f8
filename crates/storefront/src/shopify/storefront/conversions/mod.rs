//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod products;

pub use cart::{convert_cart, user_errors_message};
pub use products::convert_product;
