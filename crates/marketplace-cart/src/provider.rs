//! # Cart Provider
//!
//! Scopes a [`CartStore`] to the part of the application that mounted it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Provider Lifecycle                                   │
//! │                                                                         │
//! │  CartProvider::mount(storage, config)                                   │
//! │  ├── CartStore::new (spawns persistence writer)                         │
//! │  └── store.initialize() (load snapshot)                                 │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  state.manage(&provider) ──► AppState { cart: Some(handle) }            │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  state.use_cart()? ──► CartHandle (add_to_cart / increment / ...)       │
//! │                                                                         │
//! │  AppState::default().use_cart() ──► Err(CartError::NotProvided)         │
//! │                                                                         │
//! │  provider.unmount() ──► flush, stop writer, join                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::ops::Deref;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use marketplace_core::Cart;
use marketplace_storage::KeyValueStore;

use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::store::CartStore;

// =============================================================================
// Cart Handle
// =============================================================================

/// Shared access to a mounted cart store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CartHandle {
    store: Arc<CartStore>,
}

impl Deref for CartHandle {
    type Target = CartStore;

    fn deref(&self) -> &CartStore {
        &self.store
    }
}

// =============================================================================
// Cart Provider
// =============================================================================

/// Owns a cart store and its persistence writer for as long as it is mounted.
#[derive(Debug)]
pub struct CartProvider {
    handle: CartHandle,
    writer: JoinHandle<()>,
}

impl CartProvider {
    /// Builds the store, starts its writer and loads the stored cart.
    ///
    /// Loading failures are logged and leave the cart empty, so mounting
    /// itself cannot fail.
    pub async fn mount(storage: Arc<dyn KeyValueStore>, config: CartConfig) -> Self {
        let (store, writer) = CartStore::new(storage, config);
        store.initialize().await;

        info!(items = store.with_cart(Cart::item_count), "Cart provider mounted");

        CartProvider {
            handle: CartHandle {
                store: Arc::new(store),
            },
            writer,
        }
    }

    /// Returns a handle to the mounted store.
    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }

    /// Writes out pending snapshots and stops the writer.
    ///
    /// Handles that outlive the provider keep working in memory, but their
    /// mutations are no longer persisted.
    pub async fn unmount(self) -> CartResult<()> {
        self.handle.flush().await?;
        self.handle.stop_writer()?;

        self.writer
            .await
            .map_err(|e| CartError::Internal(format!("persistence writer panicked: {e}")))?;

        info!("Cart provider unmounted");
        Ok(())
    }
}

// =============================================================================
// App State
// =============================================================================

/// Application state the command layer reads the cart from.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    cart: Option<CartHandle>,
}

impl AppState {
    /// Creates a state with no cart mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the provider's cart available to consumers of this state.
    pub fn manage(&mut self, provider: &CartProvider) {
        if self.cart.is_some() {
            warn!("Replacing an already managed cart");
        }
        self.cart = Some(provider.handle());
    }

    /// Returns the cart.
    ///
    /// ## Errors
    /// `CartError::NotProvided` if no provider was managed by this state.
    pub fn use_cart(&self) -> CartResult<CartHandle> {
        self.cart.clone().ok_or(CartError::NotProvided)
    }
}
