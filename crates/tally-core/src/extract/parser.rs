//! Heuristic receipt parser combining the field rules.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::rules::vendors::DEFAULT_CATEGORY;
use super::rules::{title_case, AmountRule, DateRule, FieldRule, VendorMatcher};
use crate::error::Result;
use crate::models::config::ExtractionConfig;

/// Derived vendor names are cut to this many characters.
pub const MAX_VENDOR_LEN: usize = 30;

/// Vendor used when neither text nor filename yields a name.
const UNKNOWN_VENDOR: &str = "Unknown";

/// Structured fields pulled out of receipt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub vendor: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: String,
}

/// Extracted fields plus notes about what had to be defaulted.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub fields: ExtractedFields,
    /// Fields that fell back to a default.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Maps raw receipt text to vendor, amount, date and category.
///
/// Parsing never fails: every field has a fallback. Only building the
/// extractor from a configuration with a broken vendor pattern is an error.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    vendors: VendorMatcher,
    amounts: AmountRule,
    dates: DateRule,
}

impl FieldExtractor {
    /// Build an extractor from injected vendor and category tables.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            vendors: VendorMatcher::from_config(config)?,
            amounts: AmountRule::new(config.max_plausible_amount),
            dates: DateRule::new(),
        })
    }

    /// Extractor with the built-in vendor and category tables.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default()).expect("built-in vendor patterns compile")
    }

    /// Extract fields, defaulting the date to today.
    pub fn extract(&self, text: &str, filename: &str) -> ExtractedFields {
        self.extract_on(text, filename, Local::now().date_naive())
    }

    /// Extract fields with an explicit fallback date.
    pub fn extract_on(&self, text: &str, filename: &str, today: NaiveDate) -> ExtractedFields {
        self.parse(text, filename, today).fields
    }

    /// Extract fields and report which ones were defaulted.
    pub fn parse(&self, text: &str, filename: &str, today: NaiveDate) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        if text.trim().is_empty() {
            warnings.push("No text to parse, using defaults".to_string());
            return ExtractionResult {
                fields: ExtractedFields {
                    vendor: filename_vendor(filename),
                    amount: Decimal::ZERO,
                    date: today,
                    category: DEFAULT_CATEGORY.to_string(),
                },
                warnings,
                processing_time_ms: start.elapsed().as_millis() as u64,
            };
        }

        let clean = text.to_lowercase();
        let clean = clean.trim();

        let vendor = self.find_vendor(clean, filename);
        let category = self.vendors.category_for(&vendor).to_string();

        let amount = match self.amounts.extract(clean) {
            Some(found) => {
                debug!("Amount {} read from {:?}", found.value, found.source);
                found.value
            }
            None => {
                warnings.push("Could not extract amount".to_string());
                Decimal::ZERO
            }
        };

        let date = match self.dates.extract(clean) {
            Some(found) => {
                debug!("Date {} read from {:?}", found.value, found.source);
                found.value
            }
            None => {
                warnings.push("Could not extract date".to_string());
                today
            }
        };

        debug!(
            "Extracted vendor={:?} amount={} date={} category={:?}",
            vendor, amount, date, category
        );

        ExtractionResult {
            fields: ExtractedFields {
                vendor,
                amount,
                date,
                category,
            },
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn find_vendor(&self, text: &str, filename: &str) -> String {
        if let Some(found) = self.vendors.extract(text) {
            debug!("Vendor {:?} matched on {:?}", found.value, found.source);
            return title_case(&found.value);
        }

        // Only the first line is considered
        let first_line = text.lines().next().map(str::trim).unwrap_or_default();
        if !first_line.is_empty() {
            let head: String = first_line.chars().take(MAX_VENDOR_LEN).collect();
            let head = head.trim();
            if !head.is_empty() {
                return title_case(head);
            }
        }

        filename_vendor(filename)
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Vendor name derived from a filename: text before the first dot, cut to
/// [`MAX_VENDOR_LEN`] characters.
pub fn filename_vendor(filename: &str) -> String {
    let stem = filename.split('.').next().unwrap_or_default();
    let stem = if stem.trim().is_empty() { filename } else { stem };
    let name: String = stem.trim().chars().take(MAX_VENDOR_LEN).collect();

    if name.is_empty() {
        UNKNOWN_VENDOR.to_string()
    } else {
        name
    }
}
