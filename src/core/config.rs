//! User configuration stored as JSON in the platform config directory.
//!
//! A missing file is created with defaults on first use. Every field has a
//! default, so a hand-edited file only needs the keys it wants to change.

use crate::core::dirs::get_config_file;
use crate::core::error::{BarcoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub workers: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_string(),
            timeout_secs: 10,
            user_agent: format!("barco-bill/{}", env!("CARGO_PKG_VERSION")),
            workers: 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReceiptConfig {
    pub store_name: String,
    pub title: String,
    pub currency_symbol: String,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            store_name: "BarCo Bill".to_string(),
            title: "Invoice".to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BarcoConfig {
    pub lookup: LookupConfig,
    pub receipt: ReceiptConfig,
}

impl BarcoConfig {
    /// Load the user config, writing the defaults out if it does not exist yet
    pub fn load_or_create() -> Result<Self> {
        let config_file = get_config_file()?;

        if config_file.exists() {
            Self::load_from(&config_file)
        } else {
            let config = Self::default();
            config.save_to(&config_file)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BarcoError::config_read_failed(path, e))?;
        serde_json::from_str(&content).map_err(|e| BarcoError::config_parse_failed(path, e))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from an explicit path or the user config, falling back to defaults
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let loaded = match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load_or_create(),
        };

        loaded.unwrap_or_else(|e| {
            log::warn!("Using default configuration: {e}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BarcoConfig::default();
        assert_eq!(config.lookup.base_url, "https://world.openfoodfacts.org");
        assert_eq!(config.lookup.workers, 2);
        assert_eq!(config.receipt.store_name, "BarCo Bill");
        assert_eq!(config.receipt.currency_symbol, "₹");
    }

    #[test]
    fn test_partial_file_uses_defaults() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "receipt": { "currency_symbol": "$" } }"#)?;

        let config = BarcoConfig::load_from(&path)?;
        assert_eq!(config.receipt.currency_symbol, "$");
        assert_eq!(config.receipt.title, "Invoice");
        assert_eq!(config.lookup, LookupConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("config.json");

        let mut config = BarcoConfig::default();
        config.lookup.timeout_secs = 3;
        config.save_to(&path)?;

        assert_eq!(BarcoConfig::load_from(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_file_reports_path() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json")?;

        let err = BarcoConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, BarcoError::ConfigParseFailed { .. }));
        Ok(())
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let missing = dir.path().join("missing.json");
        assert_eq!(BarcoConfig::resolve(Some(&missing)), BarcoConfig::default());
        Ok(())
    }
}
