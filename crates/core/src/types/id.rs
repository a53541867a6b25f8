//! Newtype IDs for type-safe references to Shopify entities.
//!
//! Shopify identifies everything with opaque global ID strings
//! (`gid://shopify/ProductVariant/123`). The `define_id!` macro wraps those
//! strings so a variant ID can never be passed where a cart ID is expected.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use threadline_core::define_id;
/// define_id!(OrderRef);
/// define_id!(LineRef);
///
/// let order = OrderRef::new("gid://shopify/Order/1");
/// let line = LineRef::new("gid://shopify/CartLine/1");
///
/// // These are different types, so this won't compile:
/// // let _: OrderRef = line;
/// # let _ = (order, line);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the ID is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(CartId);

/// A product handle: the stable, URL-safe slug used to look a product up.
///
/// Handles are distinct from [`ProductId`]; they appear in storefront URLs
/// (`/product/{handle}`) and are what the catalog is queried by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductHandle(String);

impl ProductHandle {
    /// Parse a handle, rejecting anything that is not a lowercase slug.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError`] if the input is empty or contains characters
    /// other than ASCII lowercase letters, digits and `-`.
    pub fn parse(s: &str) -> Result<Self, HandleError> {
        if s.is_empty() {
            return Err(HandleError::Empty);
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(HandleError::InvalidChar(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur when parsing a [`ProductHandle`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("handle cannot be empty")]
    Empty,
    #[error("handle contains invalid character {0:?}")]
    InvalidChar(char),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_serde() {
        let id = VariantId::new("gid://shopify/ProductVariant/1");
        assert_eq!(id.to_string(), "gid://shopify/ProductVariant/1");

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gid://shopify/ProductVariant/1\"");
        let parsed: VariantId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_blank_id_is_empty() {
        assert!(VariantId::new("").is_empty());
        assert!(VariantId::new("  ").is_empty());
        assert!(!CartId::new("gid://shopify/Cart/abc").is_empty());
    }

    #[test]
    fn test_handle_parse() {
        assert_eq!(
            ProductHandle::parse("oxford-shirt-2").unwrap().as_str(),
            "oxford-shirt-2"
        );
        assert_eq!(ProductHandle::parse(""), Err(HandleError::Empty));
        assert_eq!(
            ProductHandle::parse("Oxford"),
            Err(HandleError::InvalidChar('O'))
        );
        assert_eq!(
            ProductHandle::parse("../etc"),
            Err(HandleError::InvalidChar('.'))
        );
    }
}
