//! # Error Types
//!
//! Domain-specific error types for marketplace-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  marketplace-core errors (this file)                                   │
//! │  ├── CoreError        - Snapshot decode/encode failures                │
//! │  └── ValidationError  - Snapshot rule violations                       │
//! │                                                                         │
//! │  marketplace-storage errors (separate crate)                           │
//! │  └── StorageError     - Key-value store failures                       │
//! │                                                                         │
//! │  marketplace-cart errors                                               │
//! │  ├── CartError        - Store/provider failures                        │
//! │  └── ApiError         - What consumers see (serialized)                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → ApiError              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of the cart mutations return these. Adding, incrementing and
//! decrementing are total; errors only arise at the snapshot boundary.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while turning a cart into its persisted form and back.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The persisted snapshot is not a JSON array of cart items.
    ///
    /// ## When This Occurs
    /// - Storage holds truncated or hand-edited JSON
    /// - A field has the wrong type (e.g. `quantity: "2"`)
    #[error("Malformed cart snapshot: {0}")]
    MalformedSnapshot(String),

    /// The cart could not be serialized.
    #[error("Failed to encode cart snapshot: {0}")]
    SnapshotEncoding(String),

    /// The snapshot parsed but breaks a cart invariant.
    #[error("Invalid cart snapshot: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rule violations found in a decoded snapshot or an incoming item.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Value must be a finite number (not NaN or infinite).
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Duplicate value (two line items with the same id).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
