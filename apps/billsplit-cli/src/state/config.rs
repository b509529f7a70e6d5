//! # Configuration State
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags
//! 2. Environment variables (`BILLSPLIT_*`, `.env` loaded first)
//! 3. Config file (`--config`, or `billsplit.toml` in the platform config dir)
//! 4. Defaults (this file)
//!
//! Read-only after loading, so no mutex.

use std::path::{Path, PathBuf};

use billsplit_core::{Bill, BillConfig, CoreResult, DiscountMode, HistoryConfig};
use billsplit_io::{ExportOptions, ImportOptions, TaxClassMap, DEFAULT_STORE_MARKER};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "billsplit.toml";

/// A category registered on every new bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPreset {
    pub name: String,
    /// Percentage, `8.25` = 8.25%
    pub tax_rate: f64,
}

/// Application configuration.
///
/// ## Example File
/// ```toml
/// currency_symbol = "$"
/// store_marker = "Aldi's"
/// default_discount_percent = 10.0
/// discount_mode = "taxable_only"
/// history_depth = 50
///
/// [tax_class_map]
/// B = "Prepared food"
///
/// [[categories]]
/// name = "Prepared food"
/// tax_rate = 8.25
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AppConfig {
    /// Currency symbol used in tables and exports
    pub currency_symbol: String,

    /// First-row marker skipped on CSV import; empty disables the check
    pub store_marker: String,

    /// Discount applied when a command does not give one, in percent
    pub default_discount_percent: f64,

    /// Which lines a discount reduces
    pub discount_mode: DiscountMode,

    /// Undo depth; `None` is unbounded
    pub history_depth: Option<usize>,

    /// Receipt tax class → category name
    pub tax_class_map: TaxClassMap,

    /// Categories registered on every new bill
    pub categories: Vec<CategoryPreset>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            currency_symbol: "$".to_string(),
            store_marker: DEFAULT_STORE_MARKER.to_string(),
            default_discount_percent: 0.0,
            discount_mode: DiscountMode::default(),
            history_depth: None,
            tax_class_map: TaxClassMap::new(),
            categories: Vec::new(),
        }
    }
}

/// Values given on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub currency_symbol: Option<String>,
    pub store_marker: Option<String>,
    pub discount_mode: Option<DiscountMode>,
    pub history_depth: Option<usize>,
}

impl AppConfig {
    /// Loads configuration from all sources.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => AppConfig::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&text)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Config file loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `BILLSPLIT_*` variables through `lookup`.
    ///
    /// ## Environment Variables
    /// - `BILLSPLIT_CURRENCY_SYMBOL`
    /// - `BILLSPLIT_STORE_MARKER`
    /// - `BILLSPLIT_DISCOUNT`: default discount percent (e.g. "10")
    /// - `BILLSPLIT_DISCOUNT_MODE`: `taxable_only` or `uniform`
    /// - `BILLSPLIT_HISTORY_DEPTH`
    pub fn apply_env<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("BILLSPLIT_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(marker) = lookup("BILLSPLIT_STORE_MARKER") {
            self.store_marker = marker;
        }

        if let Some(discount) = lookup("BILLSPLIT_DISCOUNT") {
            self.default_discount_percent = discount
                .trim()
                .parse()
                .map_err(|_| CliError::config(format!("BILLSPLIT_DISCOUNT: '{}' is not a number", discount)))?;
        }

        if let Some(mode) = lookup("BILLSPLIT_DISCOUNT_MODE") {
            self.discount_mode = mode
                .parse()
                .map_err(|e| CliError::config(format!("BILLSPLIT_DISCOUNT_MODE: {}", e)))?;
        }

        if let Some(depth) = lookup("BILLSPLIT_HISTORY_DEPTH") {
            let depth: usize = depth
                .trim()
                .parse()
                .map_err(|_| CliError::config(format!("BILLSPLIT_HISTORY_DEPTH: '{}' is not a count", depth)))?;
            self.history_depth = Some(depth);
        }

        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(symbol) = &overrides.currency_symbol {
            self.currency_symbol = symbol.clone();
        }
        if let Some(marker) = &overrides.store_marker {
            self.store_marker = marker.clone();
        }
        if let Some(mode) = overrides.discount_mode {
            self.discount_mode = mode;
        }
        if let Some(depth) = overrides.history_depth {
            self.history_depth = Some(depth);
        }
    }

    fn validate(&self) -> CliResult<()> {
        let pct = self.default_discount_percent;
        if !(0.0..100.0).contains(&pct) {
            return Err(CliError::config(format!(
                "default_discount_percent must be in [0, 100), got {}",
                pct
            )));
        }
        Ok(())
    }

    /// Default discount as a fraction.
    pub fn default_discount(&self) -> f64 {
        self.default_discount_percent / 100.0
    }

    pub fn bill_config(&self) -> BillConfig {
        BillConfig {
            history: HistoryConfig {
                max_depth: self.history_depth,
            },
            discount_mode: self.discount_mode,
        }
    }

    /// A fresh bill with the preset categories registered.
    pub fn new_bill(&self) -> CoreResult<Bill> {
        let mut bill = Bill::with_config(self.bill_config());
        self.register_categories(&mut bill)?;
        Ok(bill)
    }

    /// Registers preset categories that the bill does not have yet.
    pub fn register_categories(&self, bill: &mut Bill) -> CoreResult<()> {
        for preset in &self.categories {
            if bill.categories().get(&preset.name).is_none() {
                bill.add_category(&preset.name, preset.tax_rate)?;
            }
        }
        Ok(())
    }

    pub fn import_options(&self) -> ImportOptions {
        let marker = self.store_marker.trim();
        ImportOptions {
            store_marker: (!marker.is_empty()).then(|| marker.to_string()),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            currency_symbol: self.currency_symbol.clone(),
        }
    }

    pub fn format_amount(&self, amount: f64) -> String {
        self.export_options().format(amount)
    }
}

/// `<config_dir>/billsplit.toml` for this platform.
///
/// - **Linux**: `~/.config/billsplit/billsplit.toml`
/// - **macOS**: `~/Library/Application Support/billsplit/billsplit.toml`
/// - **Windows**: `%APPDATA%\billsplit\config\billsplit.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "billsplit").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.store_marker, "Aldi's");
        assert_eq!(config.discount_mode, DiscountMode::TaxableOnly);
        assert_eq!(config.history_depth, None);
        assert_eq!(config.default_discount(), 0.0);
    }

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            currency_symbol = "€"
            default_discount_percent = 10.0
            discount_mode = "uniform"
            history_depth = 5

            [tax_class_map]
            b = "Prepared"

            [[categories]]
            name = "Prepared"
            tax_rate = 8.25
            "#,
        )
        .unwrap();

        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.store_marker, "Aldi's");
        assert_eq!(config.discount_mode, DiscountMode::Uniform);
        assert_eq!(config.history_depth, Some(5));
        assert_eq!(config.tax_class_map.get("B"), Some("Prepared"));
        assert!((config.default_discount() - 0.10).abs() < 1e-12);

        let bill = config.new_bill().unwrap();
        assert_eq!(bill.categories().get("Prepared").unwrap().tax_rate.percentage(), 8.25);
        assert_eq!(bill.discount_mode(), DiscountMode::Uniform);
    }

    #[test]
    fn test_bad_toml() {
        assert!(AppConfig::from_toml("discount_mode = \"sometimes\"").is_err());
    }

    #[test]
    fn test_env_layer() {
        let vars: HashMap<&str, &str> = [
            ("BILLSPLIT_CURRENCY_SYMBOL", "£"),
            ("BILLSPLIT_DISCOUNT", "15"),
            ("BILLSPLIT_DISCOUNT_MODE", "uniform"),
            ("BILLSPLIT_HISTORY_DEPTH", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.currency_symbol, "£");
        assert_eq!(config.default_discount_percent, 15.0);
        assert_eq!(config.discount_mode, DiscountMode::Uniform);
        assert_eq!(config.history_depth, Some(3));
    }

    #[test]
    fn test_env_errors_are_config_errors() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|key| (key == "BILLSPLIT_DISCOUNT").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AppConfig::default();
        config.apply_overrides(&ConfigOverrides {
            store_marker: Some(String::new()),
            discount_mode: Some(DiscountMode::Uniform),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.discount_mode, DiscountMode::Uniform);
        assert_eq!(config.import_options().store_marker, None);
    }

    #[test]
    fn test_discount_range_checked() {
        let mut config = AppConfig::default();
        config.default_discount_percent = 100.0;
        assert!(config.validate().is_err());
    }
}
