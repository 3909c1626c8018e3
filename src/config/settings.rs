//! Application settings loading from config.toml
//!
//! This module provides the process-wide `AppConfig`: default currency symbols
//! used when a guild has not configured its own, and an optional database URL
//! override. Settings are loaded once at startup; per-guild configuration
//! (admin role, request channel, symbol overrides) lives in the database and
//! is written by `/setup` instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Default display suffixes for the three denominations.
pub const DEFAULT_GOLD_SYMBOL: &str = "g";
/// Default silver suffix.
pub const DEFAULT_SILVER_SYMBOL: &str = "s";
/// Default copper suffix.
pub const DEFAULT_COPPER_SYMBOL: &str = "c";

/// Process-wide application configuration parsed from config.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Database URL; falls back to `DATABASE_URL` env or a local SQLite file
    pub database_url: Option<String>,
    /// Default currency display symbols
    #[serde(default)]
    pub currency: CurrencyConfig,
}

/// Default currency symbols used when a guild has no overrides configured
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Gold denomination suffix (10000 copper)
    #[serde(default = "default_gold")]
    pub gold_symbol: String,
    /// Silver denomination suffix (100 copper)
    #[serde(default = "default_silver")]
    pub silver_symbol: String,
    /// Copper denomination suffix (1 copper)
    #[serde(default = "default_copper")]
    pub copper_symbol: String,
}

fn default_gold() -> String {
    DEFAULT_GOLD_SYMBOL.to_string()
}

fn default_silver() -> String {
    DEFAULT_SILVER_SYMBOL.to_string()
}

fn default_copper() -> String {
    DEFAULT_COPPER_SYMBOL.to_string()
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            gold_symbol: default_gold(),
            silver_symbol: default_silver(),
            copper_symbol: default_copper(),
        }
    }
}

/// Loads application configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed. A
/// missing file is not an error: every setting has a usable default.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads application configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            database_url = "sqlite://data/test.sqlite"

            [currency]
            gold_symbol = "<:gold:123>"
            silver_symbol = "<:silver:456>"
            copper_symbol = "<:copper:789>"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("sqlite://data/test.sqlite")
        );
        assert_eq!(config.currency.gold_symbol, "<:gold:123>");
        assert_eq!(config.currency.copper_symbol, "<:copper:789>");
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.currency.gold_symbol, "g");
        assert_eq!(config.currency.silver_symbol, "s");
        assert_eq!(config.currency.copper_symbol, "c");
    }
}
