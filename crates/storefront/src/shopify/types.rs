//! Domain types for Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! response shapes in `storefront::queries`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use threadline_core::Price;
use threadline_core::cart::{ProductRef, SelectedOption};
use threadline_core::types::{CartId, ProductId, VariantId};

// =============================================================================
// Image Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Price,
    /// Maximum price among all variants.
    pub max_variant_price: Price,
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["S", "M", "L"]`).
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Current price.
    pub price: Price,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
}

impl ProductVariant {
    /// Whether every option the shopper chose agrees with this variant.
    /// Options the shopper has not chosen match anything.
    fn matches(&self, chosen: &BTreeMap<String, String>) -> bool {
        self.selected_options
            .iter()
            .all(|opt| chosen.get(&opt.name).is_none_or(|value| *value == opt.value))
    }
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Product type; category filters match on this.
    pub product_type: String,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// All product images.
    pub images: Vec<Image>,
    /// Product options.
    pub options: Vec<ProductOption>,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// The first variant; what a one-click add from a product card adds.
    #[must_use]
    pub fn first_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Resolve option choices (name -> value) to a variant.
    ///
    /// Returns the first variant consistent with every choice, falling back
    /// to the first variant when nothing matches. `None` only when the
    /// product has no variants.
    #[must_use]
    pub fn select_variant(&self, chosen: &BTreeMap<String, String>) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.matches(chosen))
            .or_else(|| self.first_variant())
    }

    /// Find a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Whether the first option offers more than one value
    /// ("3 options available" on product cards).
    #[must_use]
    pub fn option_count(&self) -> Option<usize> {
        self.options
            .first()
            .map(|o| o.values.len())
            .filter(|&n| n > 1)
    }

    /// Display data a cart line keeps about this product.
    #[must_use]
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            handle: self.handle.clone(),
            title: self.title.clone(),
            image_url: self.images.first().map(|img| img.url.clone()),
        }
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A cart line as Shopify sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID (needed for updates and removals).
    pub id: String,
    /// Quantity.
    pub quantity: i64,
    /// The variant on this line.
    pub merchandise_id: VariantId,
}

/// A Shopify cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Checkout URL.
    pub checkout_url: String,
    /// Total quantity of items.
    pub total_quantity: i64,
    /// Cart lines.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Line holding a given variant.
    #[must_use]
    pub fn line_for(&self, variant_id: &VariantId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.merchandise_id == variant_id)
    }
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: VariantId,
    /// Quantity to add.
    pub quantity: i64,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: String,
    /// New quantity.
    pub quantity: i64,
}
