//! [`CartSync`] backed by Shopify's cart mutations.

use threadline_core::cart::{CartChange, CartSync, CartSyncError};
use threadline_core::types::CartId;
use tracing::{debug, instrument};

use super::storefront::StorefrontClient;
use super::types::{CartLineInput, CartLineUpdateInput};
use super::ShopifyError;

/// Mirrors local cart changes to a Shopify cart.
///
/// Shopify addresses lines by line ID, not variant, so quantity changes
/// and removals look the line up first.
#[derive(Clone)]
pub struct ShopifyCartSync {
    client: StorefrontClient,
}

impl ShopifyCartSync {
    #[must_use]
    pub const fn new(client: StorefrontClient) -> Self {
        Self { client }
    }

    async fn apply(
        &self,
        cart_id: Option<&CartId>,
        change: &CartChange,
    ) -> Result<CartId, ShopifyError> {
        let Some(cart_id) = cart_id else {
            let lines = match change {
                CartChange::Add {
                    variant_id,
                    quantity,
                }
                | CartChange::SetQuantity {
                    variant_id,
                    quantity,
                } => vec![CartLineInput {
                    merchandise_id: variant_id.clone(),
                    quantity: i64::from(*quantity),
                }],
                CartChange::Remove { .. } => vec![],
            };
            let cart = self.client.create_cart(lines).await?;
            debug!(cart_id = %cart.id, "Created remote cart");
            return Ok(cart.id);
        };

        match change {
            CartChange::Add {
                variant_id,
                quantity,
            } => {
                let cart = self
                    .client
                    .add_to_cart(
                        cart_id,
                        vec![CartLineInput {
                            merchandise_id: variant_id.clone(),
                            quantity: i64::from(*quantity),
                        }],
                    )
                    .await?;
                Ok(cart.id)
            }
            CartChange::SetQuantity {
                variant_id,
                quantity,
            } => {
                let remote = self.client.get_cart(cart_id).await?;
                let cart = match remote.line_for(variant_id) {
                    Some(line) => {
                        self.client
                            .update_cart(
                                cart_id,
                                vec![CartLineUpdateInput {
                                    id: line.id.clone(),
                                    quantity: i64::from(*quantity),
                                }],
                            )
                            .await?
                    }
                    None => {
                        self.client
                            .add_to_cart(
                                cart_id,
                                vec![CartLineInput {
                                    merchandise_id: variant_id.clone(),
                                    quantity: i64::from(*quantity),
                                }],
                            )
                            .await?
                    }
                };
                Ok(cart.id)
            }
            CartChange::Remove { variant_id } => {
                let remote = self.client.get_cart(cart_id).await?;
                let Some(line) = remote.line_for(variant_id) else {
                    return Ok(remote.id);
                };
                let cart = self
                    .client
                    .remove_from_cart(cart_id, vec![line.id.clone()])
                    .await?;
                Ok(cart.id)
            }
        }
    }
}

impl CartSync for ShopifyCartSync {
    #[instrument(skip(self, change), fields(variant_id = %change.variant_id()))]
    async fn submit(
        &self,
        cart_id: Option<&CartId>,
        change: &CartChange,
    ) -> Result<CartId, CartSyncError> {
        self.apply(cart_id, change).await.map_err(|e| match e {
            ShopifyError::UserError(message) => CartSyncError::Rejected(message),
            other => CartSyncError::Remote(other.to_string()),
        })
    }
}
