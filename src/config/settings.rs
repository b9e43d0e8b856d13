//! Application settings loading from config.toml
//!
//! The settings file is optional: every field has a default so a fresh checkout
//! runs without one. Groups listed in the file are seeded into the database on start.

use crate::core::order::StockPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// What to do when a client orders more than the remaining stock
    #[serde(default)]
    pub stock_policy: StockPolicy,
    /// VAT rate included in menu prices, used to split invoice totals
    #[serde(default = "default_vat_rate")]
    pub vat_rate: f64,
    /// Delivery groups to seed
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

/// Configuration for a single delivery group
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    /// Display name of the group
    pub name: String,
    /// Unique slug of the group
    pub slug: String,
    /// Whether the group starts active
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_vat_rate() -> f64 {
    0.09
}

const fn default_active() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stock_policy: StockPolicy::default(),
            vat_rate: default_vat_rate(),
            groups: Vec::new(),
        }
    }
}

impl Settings {
    fn validate(self) -> Result<Self> {
        if !self.vat_rate.is_finite() || self.vat_rate < 0.0 {
            return Err(Error::Config {
                message: format!("vat_rate must be a non-negative number, got {}", self.vat_rate),
            });
        }
        Ok(self)
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.validate()
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    debug!("Loading settings from {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from the default location (./config.toml), falling back to defaults
/// when the file does not exist.
pub fn load_default_config() -> Result<Settings> {
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        load_config(DEFAULT_CONFIG_PATH)
    } else {
        info!("No {DEFAULT_CONFIG_PATH} found, using default settings.");
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            stock_policy = "reject"
            vat_rate = 0.21

            [[groups]]
            name = "Amsterdam"
            slug = "amsterdam"

            [[groups]]
            name = "Utrecht"
            slug = "utrecht"
            active = false
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.stock_policy, StockPolicy::Reject);
        assert_eq!(settings.vat_rate, 0.21);
        assert_eq!(settings.groups.len(), 2);
        assert!(settings.groups[0].active);
        assert!(!settings.groups[1].active);
    }

    #[test]
    fn test_parse_empty_settings_uses_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.stock_policy, StockPolicy::Clamp);
        assert_eq!(settings.vat_rate, 0.09);
        assert!(settings.groups.is_empty());
    }

    #[test]
    fn test_parse_settings_rejects_negative_vat() {
        let result = parse_settings("vat_rate = -0.5");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_parse_settings_rejects_unknown_policy() {
        let result = parse_settings(r#"stock_policy = "oversell""#);
        assert!(result.is_err());
    }
}
