//! Cart type conversion functions.

use threadline_core::types::{CartId, VariantId};
use tracing::warn;

use crate::shopify::types::{Cart, CartLine};

use super::super::queries::{RawCart, RawUserError};

/// Convert a cart from any query that spreads `CartFields`.
///
/// Lines whose merchandise is not a product variant are skipped.
pub fn convert_cart(cart: RawCart) -> Cart {
    let lines = cart
        .lines
        .into_nodes()
        .filter_map(|line| {
            let Some(merchandise_id) = line.merchandise.id else {
                warn!(line_id = %line.id, "Cart line without variant merchandise");
                return None;
            };
            Some(CartLine {
                id: line.id,
                quantity: line.quantity,
                merchandise_id: VariantId::new(merchandise_id),
            })
        })
        .collect();

    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        total_quantity: cart.total_quantity,
        lines,
    }
}

/// Join mutation user errors into one message, `field: message` per error.
pub fn user_errors_message(errors: &[RawUserError]) -> String {
    errors
        .iter()
        .map(|e| match e.field.as_deref() {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_convert_cart_skips_non_variant_lines() {
        let raw: RawCart = serde_json::from_value(json!({
            "id": "gid://shopify/Cart/abc",
            "checkoutUrl": "https://shop.example/checkout/abc",
            "totalQuantity": 3,
            "lines": { "edges": [
                { "node": { "id": "line-1", "quantity": 2,
                    "merchandise": { "id": "gid://shopify/ProductVariant/1" } } },
                { "node": { "id": "line-2", "quantity": 1, "merchandise": {} } }
            ] }
        }))
        .unwrap();

        let cart = convert_cart(raw);
        assert_eq!(cart.id.as_str(), "gid://shopify/Cart/abc");
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(
            cart.line_for(&VariantId::new("gid://shopify/ProductVariant/1"))
                .unwrap()
                .id,
            "line-1"
        );
    }

    #[test]
    fn test_user_errors_message() {
        let errors = vec![
            RawUserError {
                field: Some(vec!["lines".to_string(), "0".to_string(), "quantity".to_string()]),
                message: "must be positive".to_string(),
            },
            RawUserError {
                field: None,
                message: "Cart is locked".to_string(),
            },
        ];
        assert_eq!(
            user_errors_message(&errors),
            "lines.0.quantity: must be positive; Cart is locked"
        );
    }
}
