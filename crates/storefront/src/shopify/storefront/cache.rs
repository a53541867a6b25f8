//! Cache types for Storefront API responses.

use crate::shopify::types::Product;

/// Cache key for catalog responses. Carts are never cached.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products { first: i64, query: Option<String> },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// `None` records that the handle does not exist.
    Product(Option<Box<Product>>),
    Products(Vec<Product>),
}
