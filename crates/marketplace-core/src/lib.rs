//! # marketplace-core: Pure Cart Logic for GoMarketplace
//!
//! This crate holds the shopping cart rules as plain data and pure
//! functions. Nothing in here touches storage; persisting a [`Cart`] is the
//! job of `marketplace-cart`, which hands the snapshot produced here to a
//! key-value store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GoMarketplace Cart Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Mobile UI / CLI (consumers)                     │   │
//! │  │      Product list ──► Add to cart ──► Cart screen (+ / -)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        marketplace-cart (CartStore, provider, commands)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           ★ marketplace-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │ validation│  │   error   │  │   │
//! │  │   │ CartItem  │  │   Cart    │  │ snapshot  │  │ CoreError │  │   │
//! │  │   │NewCartItem│  │CartChange │  │  rules    │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line item types (`CartItem`, `NewCartItem`)
//! - [`cart`] - The ordered cart collection and its three mutations
//! - [`validation`] - Rules a persisted snapshot must satisfy
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use marketplace_core::{Cart, NewCartItem};
//!
//! let mut cart = Cart::new();
//! cart.add(NewCartItem::new("1", "Banana", "https://img/banana.png", 2.0));
//! cart.add(NewCartItem::new("2", "Apple", "https://img/apple.png", 1.0));
//!
//! // Always ordered by title
//! assert_eq!(cart.items()[0].title, "Apple");
//!
//! cart.decrement("2");
//! assert_eq!(cart.item_count(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{CartItem, NewCartItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key under which the cart snapshot is persisted.
///
/// The mobile app has always written its cart here, so changing it orphans
/// every existing cart on device.
pub const CART_STORAGE_KEY: &str = "@GoMarketplace:productsData";
