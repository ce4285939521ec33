//! # Cart Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MARKETPLACE_CART_KEY=@GoMarketplace:productsData                   │
//! │     MARKETPLACE_DB_PATH=/data/gomarketplace.db                         │
//! │     MARKETPLACE_PERSIST_UNCHANGED=false                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarketplace-cart/cart.toml (Linux)                     │
//! │     ~/Library/Application Support/com.gomarketplace.cart/cart.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "@GoMarketplace:productsData"
//! database_path = "/data/gomarketplace.db"
//!
//! [persistence]
//! persist_unchanged = true  # write even when increment/decrement matched nothing
//! coalesce = true           # only write the newest of several queued snapshots
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use marketplace_core::CART_STORAGE_KEY;

use crate::error::{CartError, CartResult};

const DATABASE_FILE: &str = "gomarketplace.db";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart snapshot lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    CART_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            database_path: None,
        }
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

/// How mutations reach storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Write a snapshot even when `increment`/`decrement` matched no item.
    /// Default: true
    #[serde(default = "default_true")]
    pub persist_unchanged: bool,

    /// Let the writer skip snapshots superseded by newer queued ones.
    /// Default: true
    #[serde(default = "default_true")]
    pub coalesce: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            persist_unchanged: true,
            coalesce: true,
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage location.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Persistence behaviour.
    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage key must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies `MARKETPLACE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("MARKETPLACE_CART_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = lookup("MARKETPLACE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("MARKETPLACE_PERSIST_UNCHANGED") {
            match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.persistence.persist_unchanged = true,
                "0" | "false" | "no" => self.persistence.persist_unchanged = false,
                _ => warn!(value = %value, "Unknown MARKETPLACE_PERSIST_UNCHANGED value"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "gomarketplace", "cart")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Returns the configured database path, or the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();
        assert_eq!(config.storage_key(), "@GoMarketplace:productsData");
        assert!(config.persistence.persist_unchanged);
        assert!(config.persistence.coalesce);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CartConfig::default();
        config.storage.key = "  ".to_string();
        assert!(matches!(config.validate(), Err(CartError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CartConfig = toml::from_str("[persistence]\ncoalesce = false\n").unwrap();
        assert!(!config.persistence.coalesce);
        assert!(config.persistence.persist_unchanged);
        assert_eq!(config.storage_key(), CART_STORAGE_KEY);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MARKETPLACE_CART_KEY", "@Test:cart"),
            ("MARKETPLACE_DB_PATH", "/tmp/cart.db"),
            ("MARKETPLACE_PERSIST_UNCHANGED", "false"),
        ]);

        let mut config = CartConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage_key(), "@Test:cart");
        assert_eq!(config.database_path(), Some(PathBuf::from("/tmp/cart.db")));
        assert!(!config.persistence.persist_unchanged);
    }

    #[test]
    fn test_unknown_override_value_is_ignored() {
        let mut config = CartConfig::default();
        config.apply_overrides(|name| {
            (name == "MARKETPLACE_PERSIST_UNCHANGED").then(|| "sometimes".to_string())
        });
        assert!(config.persistence.persist_unchanged);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.toml");

        let mut config = CartConfig::default();
        config.storage.key = "@Saved:cart".to_string();
        config.persistence.coalesce = false;
        config.save(Some(path.clone())).unwrap();

        let loaded: CartConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.storage_key(), "@Saved:cart");
        assert!(!loaded.persistence.coalesce);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(&path, "[storage\nkey = 1").unwrap();

        assert!(matches!(
            CartConfig::load(Some(path)),
            Err(CartError::ConfigLoadFailed(_))
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&CartConfig::default()).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[persistence]"));
    }
}
