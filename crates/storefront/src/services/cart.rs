//! Per-session cart store.
//!
//! Each shopper's cart is a [`CartStore`]: a single logical writer that
//! applies mutations optimistically, mirrors them to the backend through a
//! [`CartSync`], and rolls back when the backend fails or times out.
//! Mutations queue on a FIFO mutex, so they apply in issue order and never
//! overlap. Every committed state is published whole through a `watch`
//! channel.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use threadline_core::cart::{AddItemInput, Cart, CartChange, CartError, CartSync, CartSyncError};
use threadline_core::types::VariantId;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

/// Abandoned carts are dropped after a day without access.
const CART_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A published cart state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub cart: Cart,
    /// A remote sync is outstanding; the lines already show its effect.
    pub is_loading: bool,
}

/// One shopper's cart.
pub struct CartStore<S> {
    sync: S,
    sync_timeout: Duration,
    queue: Mutex<()>,
    state: watch::Sender<CartSnapshot>,
}

impl<S: CartSync> CartStore<S> {
    /// An empty cart that mirrors changes through `sync`.
    #[must_use]
    pub fn new(sync: S, sync_timeout: Duration) -> Self {
        Self {
            sync,
            sync_timeout,
            queue: Mutex::new(()),
            state: watch::Sender::new(CartSnapshot::default()),
        }
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.borrow().clone()
    }

    /// Observe every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Add a variant, merging into its existing line.
    ///
    /// # Errors
    ///
    /// Validation errors leave the cart untouched. [`CartError::Sync`] means
    /// the backend refused or timed out and the cart was restored.
    #[instrument(skip(self, input), fields(variant_id = %input.variant_id, quantity = input.quantity))]
    pub async fn add_item(&self, input: AddItemInput) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| cart.add(input)).await
    }

    /// Set a line's quantity. Zero or below removes the line.
    ///
    /// # Errors
    ///
    /// As for [`Self::add_item`]; unknown variants are
    /// [`CartError::LineNotFound`].
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn update_quantity(
        &self,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| cart.set_quantity(variant_id, quantity))
            .await
    }

    /// Remove a variant's line.
    ///
    /// # Errors
    ///
    /// As for [`Self::update_quantity`].
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn remove_item(&self, variant_id: &VariantId) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| cart.remove(variant_id)).await
    }

    async fn mutate<F>(&self, apply: F) -> Result<CartSnapshot, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<CartChange, CartError>,
    {
        let _turn = self.queue.lock().await;

        let before = self.state.borrow().cart.clone();
        let mut after = before.clone();
        let change = apply(&mut after)?;
        let cart_id = after.cart_id().cloned();

        self.publish(after.clone(), true);
        // Declared after `_turn`, so a cancelled caller restores the cart
        // before the next mutation can take the queue.
        let rollback = Rollback::arm(&self.state, before);

        let outcome =
            match tokio::time::timeout(self.sync_timeout, self.sync.submit(cart_id.as_ref(), &change))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(CartSyncError::Timeout(self.sync_timeout)),
            };

        match outcome {
            Ok(remote_id) => {
                rollback.disarm();
                after.set_cart_id(remote_id);
                debug!(items = after.item_count(), "Cart change synced");
                Ok(self.publish(after, false))
            }
            Err(e) => {
                warn!(error = %e, ?change, "Cart sync failed, rolling back");
                drop(rollback);
                Err(CartError::Sync(e))
            }
        }
    }

    fn publish(&self, cart: Cart, is_loading: bool) -> CartSnapshot {
        let snapshot = CartSnapshot { cart, is_loading };
        self.state.send_replace(snapshot.clone());
        snapshot
    }
}

/// Restores the pre-mutation cart when dropped while armed.
///
/// Covers both a failed sync and a caller that stops polling mid-sync.
struct Rollback<'a> {
    state: &'a watch::Sender<CartSnapshot>,
    before: Option<Cart>,
}

impl<'a> Rollback<'a> {
    const fn arm(state: &'a watch::Sender<CartSnapshot>, before: Cart) -> Self {
        Self {
            state,
            before: Some(before),
        }
    }

    fn disarm(mut self) {
        self.before = None;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if let Some(cart) = self.before.take() {
            debug!("Restoring cart after an unfinished sync");
            self.state.send_replace(CartSnapshot {
                cart,
                is_loading: false,
            });
        }
    }
}

/// Cart stores keyed by session cart key.
#[derive(Clone)]
pub struct CartRegistry<S> {
    sync: S,
    sync_timeout: Duration,
    stores: Cache<String, Arc<CartStore<S>>>,
}

impl<S> CartRegistry<S>
where
    S: CartSync + Clone + 'static,
{
    #[must_use]
    pub fn new(sync: S, sync_timeout: Duration) -> Self {
        Self {
            sync,
            sync_timeout,
            stores: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(CART_IDLE_TTL)
                .build(),
        }
    }

    /// The store for `key`, created empty on first use.
    pub async fn get_or_create(&self, key: &str) -> Arc<CartStore<S>> {
        self.stores
            .get_with(key.to_string(), async {
                debug!(cart_key = %key, "Creating cart store");
                Arc::new(CartStore::new(self.sync.clone(), self.sync_timeout))
            })
            .await
    }

    /// The store for `key`, if the session has one.
    pub async fn get(&self, key: &str) -> Option<Arc<CartStore<S>>> {
        self.stores.get(key).await
    }
}
