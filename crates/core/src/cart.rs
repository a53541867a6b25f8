//! Shopping cart state and the remote sync capability.
//!
//! [`Cart`] is a pure reducer: every mutation either fails without touching
//! the lines or applies and returns the [`CartChange`] that the backend must
//! be told about. Lines are merged by variant ID, so adding the same variant
//! twice yields one line with the summed quantity.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{CartId, CurrencyCode, Price, PriceError, VariantId};

/// Errors raised by cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The caller did not supply a variant to add.
    #[error("a variant must be selected before adding to the cart")]
    MissingVariant,

    /// Adding zero of something is meaningless.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// No line exists for the variant.
    #[error("no cart line for variant {0}")]
    LineNotFound(VariantId),

    /// The line's currency does not match the rest of the cart.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// The backend rejected or never acknowledged the change.
    #[error("cart sync failed: {0}")]
    Sync(#[from] CartSyncError),
}

/// Errors returned by a [`CartSync`] implementation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartSyncError {
    /// Transport or upstream failure.
    #[error("remote cart unavailable: {0}")]
    Remote(String),

    /// The backend refused the change (e.g., out of stock).
    #[error("remote cart rejected change: {0}")]
    Rejected(String),

    /// No answer within the configured deadline.
    #[error("remote cart did not respond within {0:?}")]
    Timeout(Duration),
}

/// Selected option on a product variant (e.g., `Size` = `M`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "M", "Blue").
    pub value: String,
}

/// The slice of product data a cart line keeps for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub handle: String,
    pub title: String,
    pub image_url: Option<String>,
}

/// Input for [`Cart::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemInput {
    pub product: ProductRef,
    pub variant_id: VariantId,
    pub variant_title: String,
    pub price: Price,
    pub quantity: u32,
    pub selected_options: Vec<SelectedOption>,
}

/// One entry in the cart: a variant and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product: ProductRef,
    pub variant_id: VariantId,
    pub variant_title: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub selected_options: Vec<SelectedOption>,
}

impl CartLineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

impl From<AddItemInput> for CartLineItem {
    fn from(input: AddItemInput) -> Self {
        Self {
            product: input.product,
            variant_id: input.variant_id,
            variant_title: input.variant_title,
            unit_price: input.price,
            quantity: input.quantity,
            selected_options: input.selected_options,
        }
    }
}

/// A change the backend must mirror after a local mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CartChange {
    /// Add `quantity` more of a variant (creating the line if needed).
    Add {
        variant_id: VariantId,
        quantity: u32,
    },
    /// Set a line's quantity outright.
    SetQuantity {
        variant_id: VariantId,
        quantity: u32,
    },
    /// Drop the line for a variant.
    Remove { variant_id: VariantId },
}

impl CartChange {
    /// The variant the change is about.
    #[must_use]
    pub const fn variant_id(&self) -> &VariantId {
        match self {
            Self::Add { variant_id, .. }
            | Self::SetQuantity { variant_id, .. }
            | Self::Remove { variant_id } => variant_id,
        }
    }
}

/// Capability for mirroring local cart changes to the commerce backend.
///
/// `cart_id` is `None` until the first successful submit; implementations
/// create the remote cart in that case and return its ID.
pub trait CartSync: Send + Sync {
    /// Apply `change` remotely.
    fn submit(
        &self,
        cart_id: Option<&CartId>,
        change: &CartChange,
    ) -> impl Future<Output = Result<CartId, CartSyncError>> + Send;
}

/// Ordered cart lines plus the backend cart they are mirrored to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLineItem>,
    cart_id: Option<CartId>,
}

impl Cart {
    /// An empty cart with no remote counterpart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Line for a variant, if any.
    #[must_use]
    pub fn line(&self, variant_id: &VariantId) -> Option<&CartLineItem> {
        self.lines.iter().find(|l| &l.variant_id == variant_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Backend cart ID, once the cart has been synced.
    #[must_use]
    pub const fn cart_id(&self) -> Option<&CartId> {
        self.cart_id.as_ref()
    }

    /// Record the backend cart ID returned by a sync.
    pub fn set_cart_id(&mut self, cart_id: CartId) {
        self.cart_id = Some(cart_id);
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if lines disagree on currency.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        let currency = self
            .lines
            .first()
            .map_or(CurrencyCode::default(), |l| l.unit_price.currency_code);
        self.lines
            .iter()
            .try_fold(Price::zero(currency), |acc, l| acc.checked_add(l.line_total()))
    }

    /// Add a variant, merging into an existing line for the same variant.
    ///
    /// # Errors
    ///
    /// - [`CartError::MissingVariant`] if `variant_id` is blank
    /// - [`CartError::ZeroQuantity`] if `quantity` is 0
    /// - [`CartError::Price`] if the price currency differs from the cart's
    pub fn add(&mut self, input: AddItemInput) -> Result<CartChange, CartError> {
        if input.variant_id.is_empty() {
            return Err(CartError::MissingVariant);
        }
        if input.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if let Some(first) = self.lines.first()
            && first.unit_price.currency_code != input.price.currency_code
        {
            return Err(PriceError::CurrencyMismatch(
                first.unit_price.currency_code,
                input.price.currency_code,
            )
            .into());
        }

        let change = CartChange::Add {
            variant_id: input.variant_id.clone(),
            quantity: input.quantity,
        };

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.variant_id == input.variant_id)
        {
            line.quantity = line.quantity.saturating_add(input.quantity);
        } else {
            self.lines.push(input.into());
        }

        Ok(change)
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the variant is not in the cart.
    pub fn set_quantity(
        &mut self,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<CartChange, CartError> {
        if quantity <= 0 {
            return self.remove(variant_id);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.variant_id == variant_id)
            .ok_or_else(|| CartError::LineNotFound(variant_id.clone()))?;

        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        Ok(CartChange::SetQuantity {
            variant_id: variant_id.clone(),
            quantity: line.quantity,
        })
    }

    /// Remove the line for a variant.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the variant is not in the cart.
    pub fn remove(&mut self, variant_id: &VariantId) -> Result<CartChange, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| &l.variant_id == variant_id)
            .ok_or_else(|| CartError::LineNotFound(variant_id.clone()))?;

        self.lines.remove(index);

        Ok(CartChange::Remove {
            variant_id: variant_id.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tee(variant: &str, quantity: u32) -> AddItemInput {
        AddItemInput {
            product: ProductRef {
                handle: "linen-tee".to_string(),
                title: "Linen Tee".to_string(),
                image_url: None,
            },
            variant_id: VariantId::new(variant),
            variant_title: "M / Sand".to_string(),
            price: Price::whole(1299, CurrencyCode::INR),
            quantity,
            selected_options: vec![SelectedOption {
                name: "Size".to_string(),
                value: "M".to_string(),
            }],
        }
    }

    #[test]
    fn timeout_reports_sub_second_deadline() {
        let err = CartSyncError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "remote cart did not respond within 250ms");
    }

    #[test]
    fn test_add_same_variant_merges() {
        let mut cart = Cart::new();
        cart.add(tee("v1", 1)).unwrap();
        let change = cart.add(tee("v1", 1)).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(
            change,
            CartChange::Add {
                variant_id: VariantId::new("v1"),
                quantity: 1
            }
        );
    }

    #[test]
    fn test_merge_then_decrement_restores_previous_state() {
        let mut cart = Cart::new();
        cart.add(tee("v1", 1)).unwrap();
        let before = cart.clone();

        cart.add(tee("v1", 1)).unwrap();
        cart.set_quantity(&VariantId::new("v1"), 1).unwrap();

        assert_eq!(cart, before);

        cart.remove(&VariantId::new("v1")).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_distinct_variants_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(tee("v2", 1)).unwrap();
        cart.add(tee("v1", 3)).unwrap();

        let ids: Vec<_> = cart.lines().iter().map(|l| l.variant_id.as_str()).collect();
        assert_eq!(ids, ["v2", "v1"]);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_add_rejects_blank_variant_and_zero_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(tee("", 1)), Err(CartError::MissingVariant));
        assert_eq!(cart.add(tee("v1", 0)), Err(CartError::ZeroQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_non_positive_removes() {
        let mut cart = Cart::new();
        cart.add(tee("v1", 2)).unwrap();

        let change = cart.set_quantity(&VariantId::new("v1"), -3).unwrap();
        assert_eq!(
            change,
            CartChange::Remove {
                variant_id: VariantId::new("v1")
            }
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_line() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.remove(&VariantId::new("nope")),
            Err(CartError::LineNotFound(VariantId::new("nope")))
        );
        assert_eq!(
            cart.set_quantity(&VariantId::new("nope"), 2),
            Err(CartError::LineNotFound(VariantId::new("nope")))
        );
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::new();
        assert_eq!(cart.subtotal().unwrap(), Price::zero(CurrencyCode::INR));

        cart.add(tee("v1", 2)).unwrap();
        cart.add(tee("v2", 1)).unwrap();
        assert_eq!(cart.subtotal().unwrap().to_string(), "₹3,897.00");
    }

    #[test]
    fn test_add_rejects_mixed_currency() {
        let mut cart = Cart::new();
        cart.add(tee("v1", 1)).unwrap();

        let mut usd = tee("v2", 1);
        usd.price = Price::whole(15, CurrencyCode::USD);
        assert!(matches!(cart.add(usd), Err(CartError::Price(_))));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_change_serializes_with_op_tag() {
        let change = CartChange::SetQuantity {
            variant_id: VariantId::new("v1"),
            quantity: 4,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["op"], "set_quantity");
        assert_eq!(json["quantity"], 4);
    }
}
