//! Configuration structures for the receipt pipeline.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the tally pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Document acceptance rules.
    pub documents: DocumentConfig,

    /// Defaults applied to new receipts.
    pub defaults: ReceiptDefaults,

    /// Search and dashboard settings.
    pub analytics: AnalyticsConfig,

    /// Receipt store location.
    pub store: StoreConfig,
}

/// A known vendor and the pattern that identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorPattern {
    /// Lower-case vendor key, title-cased when reported.
    pub name: String,
    /// Case-insensitive regular expression matched against receipt text.
    pub pattern: String,
}

impl VendorPattern {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Known vendors, tried in order; the first match wins.
    pub vendor_patterns: Vec<VendorPattern>,

    /// Vendor key to spending category.
    pub categories: IndexMap<String, String>,

    /// Amount candidates must lie strictly between zero and this value.
    pub max_plausible_amount: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let vendor_patterns = vec![
            VendorPattern::new("walmart", r"walmart|supercenter"),
            VendorPattern::new("target", r"target"),
            VendorPattern::new("amazon", r"amazon"),
            VendorPattern::new("costco", r"costco"),
            VendorPattern::new("starbucks", r"starbucks"),
            VendorPattern::new("mcdonalds", r"mcdonald'?s"),
            VendorPattern::new("shell", r"shell"),
            VendorPattern::new("exxon", r"exxon"),
            VendorPattern::new("kroger", r"kroger"),
            VendorPattern::new("home depot", r"home\s*depot"),
        ];

        let categories = [
            ("walmart", "Groceries"),
            ("target", "Shopping"),
            ("amazon", "Online"),
            ("costco", "Wholesale"),
            ("starbucks", "Food"),
            ("mcdonalds", "Food"),
            ("shell", "Gas"),
            ("exxon", "Gas"),
            ("kroger", "Groceries"),
            ("home depot", "Home Improvement"),
        ]
        .into_iter()
        .map(|(vendor, category)| (vendor.to_string(), category.to_string()))
        .collect();

        Self {
            vendor_patterns,
            categories,
            max_plausible_amount: Decimal::from(10_000),
        }
    }
}

/// Document acceptance rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Largest accepted upload in bytes.
    pub max_file_size: usize,

    /// Accepted file extensions (lower case, without dot).
    pub allowed_extensions: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            allowed_extensions: ["jpg", "jpeg", "png", "bmp", "pdf", "txt"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Defaults applied to newly processed receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptDefaults {
    pub currency: String,
    pub language: String,
}

impl Default for ReceiptDefaults {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Search and dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Fields scored by keyword search.
    pub search_fields: Vec<String>,

    /// Maximum number of search hits returned.
    pub search_limit: usize,

    /// Maximum number of receipts loaded for analytics.
    pub fetch_limit: usize,

    /// Number of receipts shown as recent on the dashboard.
    pub recent_limit: usize,

    /// Number of vendors shown as top vendors on the dashboard.
    pub top_vendors: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            search_fields: ["vendor", "category", "text", "filename"]
                .into_iter()
                .map(String::from)
                .collect(),
            search_limit: 50,
            fetch_limit: 1000,
            recent_limit: 10,
            top_vendors: 5,
        }
    }
}

/// Receipt store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON receipt store.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("receipts.json"),
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_line_up() {
        let config = ExtractionConfig::default();
        assert_eq!(config.vendor_patterns.len(), 10);
        for vendor in &config.vendor_patterns {
            assert!(config.categories.contains_key(&vendor.name), "{}", vendor.name);
        }
        assert_eq!(config.vendor_patterns[0].name, "walmart");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: TallyConfig =
            serde_json::from_str(r#"{"analytics": {"top_vendors": 3}}"#).unwrap();
        assert_eq!(config.analytics.top_vendors, 3);
        assert_eq!(config.analytics.search_limit, 50);
        assert_eq!(config.defaults.currency, "USD");
        assert_eq!(config.extraction.max_plausible_amount, Decimal::from(10_000));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TallyConfig::default();
        config.defaults.currency = "EUR".to_string();
        config.save(&path).unwrap();

        let loaded = TallyConfig::from_file(&path).unwrap();
        assert_eq!(loaded.defaults.currency, "EUR");
        assert_eq!(loaded.extraction.vendor_patterns, config.extraction.vendor_patterns);
    }
}
