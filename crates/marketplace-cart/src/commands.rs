//! # Cart Commands
//!
//! The app-facing command layer. Each command resolves the cart from
//! [`AppState`] and returns the updated cart, or an [`ApiError`] when no
//! cart has been mounted.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_cart(state)              ──► { items, itemCount, totalQuantity }   │
//! │  add_to_cart(state, item)     ──► insert (qty 1) or +1, re-sorted       │
//! │  increment(state, id)         ──► +1 (no-op for unknown ids)            │
//! │  decrement(state, id)         ──► -1, removed at zero                   │
//! │                                                                         │
//! │  No provider managed ──► Err({ code: "NOT_PROVIDED", message })         │
//! │  NaN / infinite price ──► Err({ code: "INVALID_ITEM", message })        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use marketplace_core::validation::validate_new_item;
use marketplace_core::{Cart, CartItem, NewCartItem};

use crate::error::{ApiError, CartError};
use crate::provider::AppState;

/// Cart response including items and summary counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub item_count: usize,
    pub total_quantity: u64,
}

impl CartResponse {
    /// Builds the response for the current cart.
    pub fn from_cart(cart: &Cart) -> Self {
        CartResponse {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
        }
    }
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse::from_cart(cart)
    }
}

/// Gets the current cart contents.
pub fn get_cart(state: &AppState) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    let cart = state.use_cart()?;
    Ok(cart.with_cart(CartResponse::from_cart))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If the product is already in the cart: quantity increases by one
/// - Otherwise: added with quantity 1 and the cart re-sorted by title
///
/// ## Errors
/// `INVALID_ITEM` if the price is NaN or infinite; the cart is untouched.
pub fn add_to_cart(state: &AppState, item: NewCartItem) -> Result<CartResponse, ApiError> {
    debug!(id = %item.id, "add_to_cart command");
    let cart = state.use_cart()?;
    validate_new_item(&item).map_err(CartError::from)?;
    cart.add_to_cart(item);
    Ok(cart.with_cart(CartResponse::from_cart))
}

/// Increases the quantity of a cart line.
pub fn increment(state: &AppState, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "increment command");
    let cart = state.use_cart()?;
    cart.increment(id);
    Ok(cart.with_cart(CartResponse::from_cart))
}

/// Decreases the quantity of a cart line, removing it at zero.
pub fn decrement(state: &AppState, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "decrement command");
    let cart = state.use_cart()?;
    cart.decrement(id);
    Ok(cart.with_cart(CartResponse::from_cart))
}
