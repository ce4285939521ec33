//! # Cart
//!
//! The ordered collection of line items and the three mutations the app
//! performs on it.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutations                                       │
//! │                                                                         │
//! │  Operation            id in cart?          Result                       │
//! │  ─────────            ───────────          ──────                       │
//! │                                                                         │
//! │  add(item)            yes ───────────────► quantity += 1                │
//! │                       no  ───────────────► push(qty 1), sort by title   │
//! │                                                                         │
//! │  increment(id)        yes ───────────────► quantity += 1                │
//! │                       no  ───────────────► unchanged                    │
//! │                                                                         │
//! │  decrement(id)        yes, qty == 1 ─────► item removed                 │
//! │                       yes, qty > 1  ─────► quantity -= 1                │
//! │                       no  ───────────────► unchanged                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Ids are unique
//! - Every quantity is at least 1
//! - Items are ordered by title ascending (byte-wise, case-sensitive).
//!   Only inserts re-sort; quantity changes never move an item.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::types::{CartItem, NewCartItem};
use crate::validation::validate_items;

// =============================================================================
// Cart Change
// =============================================================================

/// What a mutation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was added with quantity 1.
    Inserted,
    /// An existing line's quantity went up; carries the new quantity.
    Incremented(u32),
    /// An existing line's quantity went down; carries the new quantity.
    Decremented(u32),
    /// The line held quantity 1 and was dropped.
    Removed,
    /// No line matched the id.
    Unmatched,
}

impl CartChange {
    /// Returns true if the cart contents differ from before the mutation.
    pub fn is_modified(&self) -> bool {
        !matches!(self, CartChange::Unmatched)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// Serializes transparently as the JSON array that is persisted. Decoding
/// goes through [`Cart::from_snapshot`] so the invariants are checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from already-persisted items.
    ///
    /// Items are validated and stably re-sorted by title, so a snapshot
    /// written by any version of the app comes back in display order.
    pub fn from_items(items: Vec<CartItem>) -> CoreResult<Self> {
        validate_items(&items)?;

        let mut cart = Cart { items };
        cart.sort_by_title();
        Ok(cart)
    }

    /// Decodes a persisted snapshot.
    ///
    /// ## Errors
    /// - `CoreError::MalformedSnapshot` if the JSON does not match the item shape
    /// - `CoreError::Validation` if it breaks a cart invariant
    pub fn from_snapshot(snapshot: &str) -> CoreResult<Self> {
        let items: Vec<CartItem> = serde_json::from_str(snapshot)
            .map_err(|e| CoreError::MalformedSnapshot(e.to_string()))?;
        Cart::from_items(items)
    }

    /// Encodes the cart in the persisted format.
    ///
    /// ## Errors
    /// - `CoreError::SnapshotEncoding` if a price is NaN or infinite, which
    ///   JSON would silently turn into `null`
    pub fn to_snapshot(&self) -> CoreResult<String> {
        if let Some(item) = self.items.iter().find(|i| !i.price.is_finite()) {
            return Err(CoreError::SnapshotEncoding(format!(
                "price of '{}' is not a finite number",
                item.id
            )));
        }

        serde_json::to_string(&self.items).map_err(|e| CoreError::SnapshotEncoding(e.to_string()))
    }

    /// Adds a product, or bumps its quantity if it is already in the cart.
    pub fn add(&mut self, item: NewCartItem) -> CartChange {
        if self.position(&item.id).is_some() {
            return self.increment(&item.id);
        }

        self.items.push(CartItem::from_new(item));
        self.sort_by_title();
        CartChange::Inserted
    }

    /// Increases the quantity of `id` by one.
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Incremented(item.quantity)
            }
            None => CartChange::Unmatched,
        }
    }

    /// Decreases the quantity of `id` by one, removing the line at zero.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(index) = self.position(id) else {
            return CartChange::Unmatched;
        };

        // position() only returns in-bounds indices
        let item = &mut self.items[index];
        if item.quantity <= 1 {
            self.items.remove(index);
            CartChange::Removed
        } else {
            item.quantity -= 1;
            CartChange::Decremented(item.quantity)
        }
    }

    /// Items in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Looks up a line by id.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Index of the line with `id`, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Returns the number of unique lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Stable, so lines with equal titles keep their relative order.
    fn sort_by_title(&mut self) {
        self.items.sort_by(|a, b| a.title.cmp(&b.title));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
