//! # Cart Error Types
//!
//! Errors for the cart store and the serializable error its command
//! surface returns.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Cart                               │
//! │                                                                         │
//! │  use_cart() without provider ──► CartError::NotProvided ──► ApiError   │
//! │                                   (wiring bug, returned, never panics)  │
//! │                                                                         │
//! │  initialize():                                                          │
//! │    storage read fails ──► StorageError ─┐                               │
//! │    snapshot malformed ──► CoreError ────┴─► warn!, cart stays empty     │
//! │                                                                         │
//! │  persistence writer:                                                    │
//! │    storage write fails ──► error!, not retried, caller never sees it    │
//! │                                                                         │
//! │  add_to_cart command: non-finite price ──► CartError::InvalidItem       │
//! │  store mutations themselves: no errors (total operations)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use marketplace_core::{CoreError, ValidationError};
use marketplace_storage::StorageError;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart store errors.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Wiring Errors
    // =========================================================================
    /// The cart was requested from an `AppState` with no mounted provider.
    #[error("cart must be used within a CartProvider")]
    NotProvided,

    /// A product handed to a command cannot be stored.
    #[error("Invalid cart item: {0}")]
    InvalidItem(#[from] ValidationError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid cart configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Key-value storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot could not be decoded or encoded.
    #[error(transparent)]
    Snapshot(#[from] CoreError),

    /// The persistence writer has stopped.
    #[error("Cart persistence writer has stopped")]
    PersisterClosed,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal cart error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// API Error
// =============================================================================

/// Error returned from the cart commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_PROVIDED",
///   "message": "cart must be used within a CartProvider"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Cart requested outside a provider
    NotProvided,

    /// Product rejected before reaching the cart
    InvalidItem,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotProvided => ApiError::new(ErrorCode::NotProvided, err.to_string()),
            CartError::InvalidItem(_) => ApiError::new(ErrorCode::InvalidItem, err.to_string()),
            CartError::Storage(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Cart storage failed: {}", e);
                ApiError::new(ErrorCode::Internal, "Cart storage is unavailable")
            }
            _ => {
                tracing::error!("Internal cart error: {}", err);
                ApiError::new(ErrorCode::Internal, err.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_provided_message() {
        assert_eq!(
            CartError::NotProvided.to_string(),
            "cart must be used within a CartProvider"
        );
    }

    #[test]
    fn test_invalid_item_code() {
        let err = CartError::from(ValidationError::NotFinite {
            field: "price".into(),
        });
        let api = ApiError::from(err);

        assert_eq!(api.code, ErrorCode::InvalidItem);
        assert_eq!(serde_json::to_value(&api).unwrap()["code"], "INVALID_ITEM");
        assert!(api.message.contains("price must be a finite number"));
    }

    #[test]
    fn test_api_error_serialization() {
        let api: ApiError = CartError::NotProvided.into();
        let json = serde_json::to_value(&api).unwrap();

        assert_eq!(json["code"], "NOT_PROVIDED");
        assert_eq!(json["message"], "cart must be used within a CartProvider");
    }

    #[test]
    fn test_storage_errors_are_masked() {
        let err = CartError::Storage(StorageError::QueryFailed("disk I/O error".into()));
        let api = ApiError::from(err);

        assert_eq!(api.code, ErrorCode::Internal);
        assert!(!api.message.contains("disk"));
    }
}
