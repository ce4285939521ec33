//! # Cart Store
//!
//! Holds the live cart, applies the three cart mutations, and hands every
//! resulting snapshot to the persistence writer.
//!
//! ## Thread Safety
//! The cart sits behind a `std::sync::Mutex`. Every mutation runs to
//! completion under the lock, and the post-mutation copy is queued for the
//! writer before the lock is released. The lock is never held across an
//! `.await`.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Consumer Action          Store Method            Cart Change           │
//! │  ───────────────          ────────────            ───────────           │
//! │                                                                         │
//! │  Mount provider ─────────► initialize() ────────► load snapshot         │
//! │                                                                         │
//! │  Tap "add" ──────────────► add_to_cart(item) ───► insert + sort, or +1  │
//! │                                                                         │
//! │  Tap "+" ────────────────► increment(id) ───────► quantity + 1          │
//! │                                                                         │
//! │  Tap "-" ────────────────► decrement(id) ───────► quantity - 1 / remove │
//! │                                                                         │
//! │  Render list ────────────► products() ──────────► (read only)           │
//! │                                                                         │
//! │  NOTE: Every mutation enqueues exactly one snapshot (unless it matched  │
//! │        nothing and persist_unchanged is off).                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use marketplace_core::{Cart, CartChange, CartItem, NewCartItem};
use marketplace_storage::KeyValueStore;

use crate::config::CartConfig;
use crate::error::CartResult;
use crate::persist::{Persister, PersisterHandle};

/// The cart and its link to persistent storage.
pub struct CartStore {
    cart: Mutex<Cart>,
    loaded: AtomicBool,
    storage: Arc<dyn KeyValueStore>,
    persister: PersisterHandle,
    config: Arc<CartConfig>,
}

impl CartStore {
    /// Creates an empty, not-yet-loaded store and spawns its writer.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// completes once the writer has shut down.
    pub fn new(storage: Arc<dyn KeyValueStore>, config: CartConfig) -> (Self, JoinHandle<()>) {
        let (persister, handle) = Persister::new(
            storage.clone(),
            config.storage_key(),
            config.persistence.coalesce,
        );
        let writer = tokio::spawn(persister.run());

        let store = CartStore {
            cart: Mutex::new(Cart::new()),
            loaded: AtomicBool::new(false),
            storage,
            persister: handle,
            config: Arc::new(config),
        };

        (store, writer)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Restores the cart from storage.
    ///
    /// A missing snapshot means an empty cart. A failed read or an
    /// unreadable snapshot is logged and also leaves the cart empty; neither
    /// is reported to the caller. Loading never triggers a write.
    pub async fn initialize(&self) {
        let key = self.config.storage_key();

        let cart = match self.read_snapshot().await {
            Ok(Some(cart)) => {
                info!(key = %key, items = cart.item_count(), "Cart restored from storage");
                cart
            }
            Ok(None) => {
                debug!(key = %key, "No stored cart, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to restore cart, starting empty");
                Cart::new()
            }
        };

        *self.lock() = cart;
        self.loaded.store(true, Ordering::SeqCst);
    }

    async fn read_snapshot(&self) -> CartResult<Option<Cart>> {
        let Some(raw) = self.storage.get(self.config.storage_key()).await? else {
            return Ok(None);
        };
        Ok(Some(Cart::from_snapshot(&raw)?))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product with quantity 1, or bumps it if already present.
    pub fn add_to_cart(&self, item: NewCartItem) -> CartChange {
        let id = item.id.clone();
        let change = self.mutate(|cart| cart.add(item));
        debug!(id = %id, ?change, "add_to_cart");
        change
    }

    /// Increases the quantity of `id` by one.
    pub fn increment(&self, id: &str) -> CartChange {
        let change = self.mutate(|cart| cart.increment(id));
        debug!(id = %id, ?change, "increment");
        change
    }

    /// Decreases the quantity of `id` by one, removing the line at zero.
    pub fn decrement(&self, id: &str) -> CartChange {
        let change = self.mutate(|cart| cart.decrement(id));
        debug!(id = %id, ?change, "decrement");
        change
    }

    fn mutate<F>(&self, op: F) -> CartChange
    where
        F: FnOnce(&mut Cart) -> CartChange,
    {
        let mut cart = self.lock();
        let change = op(&mut cart);

        if change.is_modified() || self.config.persistence.persist_unchanged {
            // Still under the lock: queue order is mutation order
            self.persister.enqueue(cart.clone());
        }

        change
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns true once `initialize` has finished.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Copy of the items in display order.
    pub fn products(&self) -> Vec<CartItem> {
        self.with_cart(|cart| cart.items().to_vec())
    }

    /// Copy of the whole cart.
    pub fn cart(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let count = store.with_cart(|cart| cart.item_count());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.lock();
        f(&cart)
    }

    /// Configuration the store was built with.
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    // =========================================================================
    // Persistence Control
    // =========================================================================

    /// Waits until every snapshot queued so far has been handled.
    pub async fn flush(&self) -> CartResult<()> {
        self.persister.flush().await
    }

    /// Asks the writer to stop once its queue is drained.
    pub(crate) fn stop_writer(&self) -> CartResult<()> {
        self.persister.shutdown()
    }

    /// Number of snapshots queued since the store was created.
    pub fn snapshots_queued(&self) -> u64 {
        self.persister.queued()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        // Cart operations cannot leave the cart half-updated, so a poisoned
        // lock still guards a valid cart.
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.lock())
            .field("loaded", &self.is_loaded())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
