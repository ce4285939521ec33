//! # marketplace-storage: Key-Value Storage for GoMarketplace
//!
//! The cart persists a single JSON snapshot under a single key. This crate
//! defines the storage seam ([`KeyValueStore`]) and ships two backends:
//! an on-device SQLite store and an in-memory store used by tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GoMarketplace Storage Flow                          │
//! │                                                                         │
//! │  CartStore persistence writer                                          │
//! │       │  store.set("@GoMarketplace:productsData", "[…]")                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               marketplace-storage (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │   Database    │    │ MemoryStore  │  │   │
//! │  │   │   (kv.rs)     │◄───│   (pool.rs)   │    │ (memory.rs)  │  │   │
//! │  │   │ get/set/remove│    │ SqlitePool    │    │ HashMap      │  │   │
//! │  │   └───────────────┘    │ KeyValueRepo  │    │ fault toggles│  │   │
//! │  │                        └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SQLite file (kv_store table)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marketplace_storage::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("path/to/gomarketplace.db")).await?;
//! db.set("@GoMarketplace:productsData", "[]").await?;
//! let snapshot = db.get("@GoMarketplace:productsData").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StorageError, StorageResult};
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use repository::kv::KeyValueRepository;
