//! # Cart Types
//!
//! Line item types shared by the cart, the storage snapshot and the
//! front end (via generated TypeScript bindings).
//!
//! ## Persisted Shape
//! ```text
//! [
//!   { "id": "2", "title": "Apple",  "image_url": "…", "price": 1.0, "quantity": 1 },
//!   { "id": "1", "title": "Banana", "image_url": "…", "price": 2.0, "quantity": 3 }
//! ]
//! ```
//! There is no version field. Any change to these field names is a breaking
//! change for carts already stored on devices.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Cart Item
// =============================================================================

/// A product line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product identifier. Unique within a cart.
    pub id: String,

    /// Display title. The cart is ordered by this field.
    pub title: String,

    /// Product image. Older clients wrote `imageUrl`, so both are read.
    #[serde(alias = "imageUrl")]
    pub image_url: String,

    /// Unit price as shown in the catalogue.
    pub price: f64,

    /// Units in the cart, always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Builds a line with quantity 1 from a catalogue product.
    pub fn from_new(item: NewCartItem) -> Self {
        CartItem {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }
}

// =============================================================================
// New Cart Item
// =============================================================================

/// A product as handed to `add`: everything but the quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCartItem {
    pub id: String,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: f64,
}

impl NewCartItem {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewCartItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<NewCartItem> for CartItem {
    fn from(item: NewCartItem) -> Self {
        CartItem::from_new(item)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
