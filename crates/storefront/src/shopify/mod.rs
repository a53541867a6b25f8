//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents posted with `reqwest`, responses decoded
//!   with `serde` into raw types and converted to the domain types in
//!   [`types`]
//! - Shopify is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog responses; concurrent requests
//!   for the same key share a single upstream fetch
//!
//! # Example
//!
//! ```rust,ignore
//! use threadline_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify)?;
//!
//! // Featured products for the home page
//! let products = client.get_products(8, None).await?;
//!
//! // A single product, or `None` if the handle does not exist
//! let product = client.get_product_by_handle("oxford-shirt").await?;
//! ```

mod cart_sync;
mod storefront;
pub mod types;

pub use cart_sync::ShopifyCartSync;
pub use storefront::StorefrontClient;
pub use types::*;

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but held values we cannot use.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// Error from a fetch shared by several concurrent callers.
    #[error(transparent)]
    Shared(Arc<Self>),
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::NotFound("cart-123".to_string());
        assert_eq!(err.to_string(), "Not found: cart-123");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError::message("Field not found"),
            GraphQLError::message("Invalid ID"),
        ];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("products".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: products.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_empty() {
        assert_eq!(
            ShopifyError::GraphQL(vec![]).to_string(),
            "GraphQL errors: (no error details provided)"
        );
        assert_eq!(
            ShopifyError::GraphQL(vec![GraphQLError::message("")]).to_string(),
            "GraphQL errors: [error 1]: (no details)"
        );
    }

    #[test]
    fn test_shared_error_is_transparent() {
        let err = ShopifyError::Shared(Arc::new(ShopifyError::RateLimited(60)));
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
