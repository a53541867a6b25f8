//! Shopify Storefront API client implementation.
//!
//! Posts hand-written GraphQL documents with `reqwest` 0.13.
//! Caches catalog reads using `moka`; carts always go to Shopify.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use threadline_core::types::CartId;
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput, Product};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::{CacheKey, CacheValue};
use conversions::{convert_cart, convert_product, user_errors_message};
use queries::{
    CartData, CartLinesVariables, CartVariables, CreateCartInput, CreateCartVariables,
    MutationData, Operation, ProductData, ProductVariables, ProductsData, ProductsVariables,
    QueryBody, RemoveLinesVariables, Response,
};

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone. Catalog reads are cached for the configured TTL and
/// concurrent reads of the same key share one upstream request.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_header: (&'static str, String),
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: config.endpoint(),
                access_header: config.access_header(),
                cache,
            }),
        })
    }

    /// Execute a GraphQL operation.
    async fn execute<V, D>(&self, operation: Operation, variables: V) -> Result<D, ShopifyError>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let body = QueryBody {
            query: operation.document(),
            operation_name: operation.name(),
            variables,
        };
        let (header, token) = &self.inner.access_header;

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(*header, token)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        let response_text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            tracing::error!(
                operation = operation.name(),
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            ))]));
        }

        let response: Response<D> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                operation = operation.name(),
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Shopify GraphQL response"
            );
            ShopifyError::Parse(e)
        })?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(operation = operation.name(), errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e
                            .locations
                            .into_iter()
                            .map(|l| GraphQLErrorLocation {
                                line: l.line,
                                column: l.column,
                            })
                            .collect(),
                        path: e.path,
                    })
                    .collect(),
            ));
        }

        response
            .data
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get up to `first` products, optionally filtered by a Shopify search
    /// query (e.g. `product_type:men`).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or a product is malformed.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: i64,
        query: Option<String>,
    ) -> Result<Vec<Product>, ShopifyError> {
        let key = CacheKey::Products {
            first,
            query: query.clone(),
        };

        let value = self
            .inner
            .cache
            .try_get_with(key, async move {
                let data: ProductsData = self
                    .execute(Operation::GetProducts, ProductsVariables { first, query })
                    .await?;
                let products = data
                    .products
                    .into_nodes()
                    .map(convert_product)
                    .collect::<Result<Vec<_>, _>>()?;
                debug!(count = products.len(), "Fetched products");
                Ok::<_, ShopifyError>(CacheValue::Products(products))
            })
            .await
            .map_err(ShopifyError::Shared)?;

        match value {
            CacheValue::Products(products) => Ok(products),
            CacheValue::Product(_) => Err(ShopifyError::InvalidData(
                "product list cache entry held a single product".to_string(),
            )),
        }
    }

    /// Get a product by its handle. `Ok(None)` if no such product exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the product is malformed.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<Product>, ShopifyError> {
        let key = CacheKey::Product(handle.to_string());
        let handle = handle.to_string();

        let value = self
            .inner
            .cache
            .try_get_with(key, async move {
                let data: ProductData = self
                    .execute(Operation::GetProductByHandle, ProductVariables { handle })
                    .await?;
                let product = data.product.map(convert_product).transpose()?;
                Ok::<_, ShopifyError>(CacheValue::Product(product.map(Box::new)))
            })
            .await
            .map_err(ShopifyError::Shared)?;

        match value {
            CacheValue::Product(product) => Ok(product.map(|p| *p)),
            CacheValue::Products(_) => Err(ShopifyError::InvalidData(
                "product cache entry held a product list".to_string(),
            )),
        }
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Run a cart mutation and unwrap its payload.
    async fn mutate_cart<V: Serialize>(
        &self,
        operation: Operation,
        root_field: &str,
        variables: V,
    ) -> Result<Cart, ShopifyError> {
        let mut data: MutationData = self.execute(operation, variables).await?;

        let payload = data
            .remove(root_field)
            .flatten()
            .ok_or_else(|| ShopifyError::InvalidData(format!("{root_field} returned no payload")))?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(user_errors_message(
                &payload.user_errors,
            )));
        }

        payload
            .cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::InvalidData(format!("{root_field} returned no cart")))
    }

    /// Create a new cart holding `lines`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        self.mutate_cart(
            Operation::CreateCart,
            "cartCreate",
            CreateCartVariables {
                input: CreateCartInput { lines },
            },
        )
        .await
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::NotFound`] if the cart does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let data: CartData = self
            .execute(
                Operation::GetCart,
                CartVariables {
                    cart_id: cart_id.to_string(),
                },
            )
            .await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate_cart(
            Operation::AddToCart,
            "cartLinesAdd",
            CartLinesVariables {
                cart_id: cart_id.to_string(),
                lines,
            },
        )
        .await
    }

    /// Set quantities on existing cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate_cart(
            Operation::UpdateCartLines,
            "cartLinesUpdate",
            CartLinesVariables {
                cart_id: cart_id.to_string(),
                lines,
            },
        )
        .await
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate_cart(
            Operation::RemoveFromCart,
            "cartLinesRemove",
            RemoveLinesVariables {
                cart_id: cart_id.to_string(),
                line_ids,
            },
        )
        .await
    }
}

fn map_transport_error(e: reqwest::Error) -> ShopifyError {
    if e.is_timeout() {
        ShopifyError::Timeout
    } else {
        ShopifyError::Http(e)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::tests::test_config;
    use crate::test_support::{cart_json, product_json, products_response};

    fn client(server: &MockServer) -> StorefrontClient {
        StorefrontClient::new(&test_config(&server.uri()).shopify).unwrap()
    }

    #[tokio::test]
    async fn get_products_sends_public_token_and_converts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Shopify-Storefront-Access-Token", "public_token_value"))
            .and(body_string_contains("GetProducts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_response(&[
                product_json("oxford-shirt", "Oxford Shirt", "men", "1499.00"),
                product_json("linen-dress", "Linen Dress", "women", "2999.00"),
            ])))
            .mount(&server)
            .await;

        let products = client(&server).get_products(8, None).await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[1].handle, "linen-dress");
    }

    #[tokio::test]
    async fn catalog_reads_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_response(&[
                product_json("oxford-shirt", "Oxford Shirt", "men", "1499.00"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client.get_products(50, None).await.unwrap();
        client.get_products(50, None).await.unwrap();
    }

    #[tokio::test]
    async fn missing_product_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "product": null } })),
            )
            .mount(&server)
            .await;

        let product = client(&server).get_product_by_handle("nope").await.unwrap();
        assert!(product.is_none());
    }

    #[tokio::test]
    async fn graphql_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [ { "message": "Throttled" } ]
            })))
            .mount(&server)
            .await;

        let err = client(&server).get_products(8, None).await.unwrap_err();
        assert!(err.to_string().contains("Throttled"), "got: {err}");
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let err = client(&server).get_cart(&CartId::new("c1")).await.unwrap_err();
        assert!(matches!(err, ShopifyError::RateLimited(7)));
    }

    #[tokio::test]
    async fn cart_mutation_user_errors_fail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("cartLinesAdd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "cartLinesAdd": {
                    "cart": null,
                    "userErrors": [ { "field": ["lines"], "message": "Variant is sold out" } ]
                } }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .add_to_cart(
                &CartId::new("gid://shopify/Cart/1"),
                vec![CartLineInput {
                    merchandise_id: "gid://shopify/ProductVariant/1".into(),
                    quantity: 1,
                }],
            )
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ShopifyError::UserError(msg) if msg == "lines: Variant is sold out"),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn create_cart_returns_cart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("cartCreate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "cartCreate": {
                    "cart": cart_json("gid://shopify/Cart/new", &[("line-1", "gid://shopify/ProductVariant/1", 2)]),
                    "userErrors": []
                } }
            })))
            .mount(&server)
            .await;

        let cart = client(&server)
            .create_cart(vec![CartLineInput {
                merchandise_id: "gid://shopify/ProductVariant/1".into(),
                quantity: 2,
            }])
            .await
            .unwrap();
        assert_eq!(cart.id.as_str(), "gid://shopify/Cart/new");
        assert_eq!(cart.lines[0].quantity, 2);
    }
}
