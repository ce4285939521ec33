//! # Validation Module
//!
//! Rules a decoded snapshot must satisfy before it may become the live
//! cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Snapshot Load Layers                               │
//! │                                                                         │
//! │  Layer 1: serde_json                                                   │
//! │  ├── Shape checks (array of objects, field types)                      │
//! │  └── quantity must fit u32 (negative values rejected here)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── price finite                                                      │
//! │  ├── quantity >= 1                                                     │
//! │  └── ids unique                                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Cart::from_items (stable re-sort by title)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations never go through here. Any id, including an empty one,
//! is a valid key, so every cart `add` builds from finite prices loads
//! back unchanged. Products arriving from outside are checked with
//! [`validate_new_item`] first: JSON has no NaN or infinity.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{CartItem, NewCartItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a single line item.
///
/// ## Rules
/// - `price` must be finite
/// - `quantity` must be at least 1
///
/// ## Example
/// ```rust
/// use marketplace_core::{CartItem, NewCartItem};
/// use marketplace_core::validation::validate_item;
///
/// let mut item = CartItem::from_new(NewCartItem::new("1", "Banana", "b.png", 2.0));
/// assert!(validate_item(&item).is_ok());
///
/// item.quantity = 0;
/// assert!(validate_item(&item).is_err());
/// ```
pub fn validate_item(item: &CartItem) -> ValidationResult<()> {
    validate_price(item.price)?;

    if item.quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a product before it is added to the cart.
pub fn validate_new_item(item: &NewCartItem) -> ValidationResult<()> {
    validate_price(item.price)
}

fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates every item and checks that ids are unique.
pub fn validate_items(items: &[CartItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_item(item)?;

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: item.id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
