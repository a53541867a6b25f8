//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::CartRegistry;
use crate::shopify::{ShopifyCartSync, ShopifyError, StorefrontClient};

/// Cart registry wired to Shopify.
pub type Carts = CartRegistry<ShopifyCartSync>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the Shopify client, the per-session carts and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    carts: Carts,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ShopifyError> {
        let storefront = StorefrontClient::new(&config.shopify)?;
        let carts = CartRegistry::new(
            ShopifyCartSync::new(storefront.clone()),
            config.cart.sync_timeout,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                carts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the per-session cart stores.
    #[must_use]
    pub fn carts(&self) -> &Carts {
        &self.inner.carts
    }
}
