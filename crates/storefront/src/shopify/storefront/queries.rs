//! GraphQL documents for the Shopify Storefront API and the raw response
//! shapes they decode into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Documents
// =============================================================================

const PRODUCT_FIELDS: &str = r"
fragment ProductFields on Product {
  id
  handle
  title
  description
  productType
  priceRange {
    minVariantPrice { amount currencyCode }
    maxVariantPrice { amount currencyCode }
  }
  images(first: 10) { edges { node { url altText } } }
  options { name values }
  variants(first: 50) {
    edges {
      node {
        id
        title
        availableForSale
        price { amount currencyCode }
        selectedOptions { name value }
      }
    }
  }
}
";

const CART_FIELDS: &str = r"
fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        merchandise { ... on ProductVariant { id } }
      }
    }
  }
}
";

const GET_PRODUCTS: &str = r"
query GetProducts($first: Int!, $query: String) {
  products(first: $first, query: $query) {
    edges { node { ...ProductFields } }
  }
}
";

const GET_PRODUCT_BY_HANDLE: &str = r"
query GetProductByHandle($handle: String!) {
  product(handle: $handle) { ...ProductFields }
}
";

const CREATE_CART: &str = r"
mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";

const GET_CART: &str = r"
query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
";

const ADD_TO_CART: &str = r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";

const UPDATE_CART_LINES: &str = r"
mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";

const REMOVE_FROM_CART: &str = r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";

/// A named operation: its document plus the fragment it spreads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetProducts,
    GetProductByHandle,
    CreateCart,
    GetCart,
    AddToCart,
    UpdateCartLines,
    RemoveFromCart,
}

impl Operation {
    /// Operation name, used for logging.
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetProducts => "GetProducts",
            Self::GetProductByHandle => "GetProductByHandle",
            Self::CreateCart => "CreateCart",
            Self::GetCart => "GetCart",
            Self::AddToCart => "AddToCart",
            Self::UpdateCartLines => "UpdateCartLines",
            Self::RemoveFromCart => "RemoveFromCart",
        }
    }

    /// Full document text sent to Shopify.
    pub fn document(self) -> String {
        let (body, fragment) = match self {
            Self::GetProducts => (GET_PRODUCTS, PRODUCT_FIELDS),
            Self::GetProductByHandle => (GET_PRODUCT_BY_HANDLE, PRODUCT_FIELDS),
            Self::CreateCart => (CREATE_CART, CART_FIELDS),
            Self::GetCart => (GET_CART, CART_FIELDS),
            Self::AddToCart => (ADD_TO_CART, CART_FIELDS),
            Self::UpdateCartLines => (UPDATE_CART_LINES, CART_FIELDS),
            Self::RemoveFromCart => (REMOVE_FROM_CART, CART_FIELDS),
        };
        format!("{body}{fragment}")
    }
}

/// Request body for a GraphQL POST.
#[derive(Debug, Serialize)]
pub struct QueryBody<V> {
    pub query: String,
    #[serde(rename = "operationName")]
    pub operation_name: &'static str,
    pub variables: V,
}

// =============================================================================
// Envelope
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct Response<D> {
    pub data: Option<D>,
    pub errors: Option<Vec<RawGraphQLError>>,
}

#[derive(Debug, Deserialize)]
pub struct RawGraphQLError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub locations: Vec<RawLocation>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawLocation {
    pub line: i64,
    pub column: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|e| e.node)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMoney {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPriceRange {
    pub min_variant_price: RawMoney,
    pub max_variant_price: RawMoney,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOption {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: RawMoney,
    pub selected_options: Vec<RawSelectedOption>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_type: String,
    pub price_range: RawPriceRange,
    pub images: Connection<RawImage>,
    #[serde(default)]
    pub options: Vec<RawOption>,
    pub variants: Connection<RawVariant>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Connection<RawProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product: Option<RawProduct>,
}

#[derive(Debug, Serialize)]
pub struct ProductsVariables {
    pub first: i64,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductVariables {
    pub handle: String,
}

// =============================================================================
// Carts
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawMerchandise {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCartLine {
    pub id: String,
    pub quantity: i64,
    pub merchandise: RawMerchandise,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCart {
    pub id: String,
    pub checkout_url: String,
    pub total_quantity: i64,
    pub lines: Connection<RawCartLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Payload shared by every cart mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub cart: Option<RawCart>,
    #[serde(default)]
    pub user_errors: Vec<RawUserError>,
}

/// Mutation data keyed by the mutation's root field (`cartCreate`, ...).
pub type MutationData = HashMap<String, Option<CartPayload>>;

#[derive(Debug, Deserialize)]
pub struct CartData {
    pub cart: Option<RawCart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartVariables {
    pub cart_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCartVariables<L> {
    pub input: CreateCartInput<L>,
}

#[derive(Debug, Serialize)]
pub struct CreateCartInput<L> {
    pub lines: Vec<L>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesVariables<L> {
    pub cart_id: String,
    pub lines: Vec<L>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLinesVariables {
    pub cart_id: String,
    pub line_ids: Vec<String>,
}
