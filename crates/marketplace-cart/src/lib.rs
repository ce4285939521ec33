//! # marketplace-cart: Cart State for GoMarketplace
//!
//! The live shopping cart of the app: an in-memory [`Cart`] behind a
//! [`CartStore`], loaded from and saved to a [`KeyValueStore`].
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart State Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 Commands (get_cart, add_to_cart, ...)            │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ AppState::use_cart()                    │
//! │                               ▼                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CartProvider ──owns──► CartStore (Mutex<Cart>)                  │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ snapshot per mutation (in order)        │
//! │                               ▼                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Persister task ──► KeyValueStore::set(key, snapshot)            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`store`] - `CartStore`, the three mutations and loading
//! - [`persist`] - Ordered background snapshot writer
//! - [`provider`] - `CartProvider`, `CartHandle`, `AppState`
//! - [`commands`] - JSON-shaped command layer
//! - [`config`] - Cart configuration (TOML + env)
//! - [`error`] - Cart and API error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marketplace_cart::{AppState, CartConfig, CartProvider};
//!
//! let provider = CartProvider::mount(storage, CartConfig::load_or_default(None)).await;
//! let mut state = AppState::new();
//! state.manage(&provider);
//!
//! let cart = state.use_cart()?;
//! cart.add_to_cart(NewCartItem::new("1", "Apple", "https://img/apple.png", 1.0));
//!
//! provider.unmount().await?;
//! ```
//!
//! [`Cart`]: marketplace_core::Cart
//! [`KeyValueStore`]: marketplace_storage::KeyValueStore

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commands;
pub mod config;
pub mod error;
pub mod persist;
pub mod provider;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use commands::CartResponse;
pub use config::{CartConfig, PersistenceSettings, StorageSettings};
pub use error::{ApiError, CartError, CartResult, ErrorCode};
pub use persist::{Persister, PersisterHandle};
pub use provider::{AppState, CartHandle, CartProvider};
pub use store::CartStore;
