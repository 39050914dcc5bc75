//! Vendor detection and vendor-to-category lookup.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use super::{ExtractionMatch, FieldRule};
use crate::error::TallyError;
use crate::models::config::ExtractionConfig;

/// Category assigned when a vendor has no mapping.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Compiled vendor patterns plus the category table.
#[derive(Debug, Clone)]
pub struct VendorMatcher {
    patterns: Vec<(String, Regex)>,
    categories: HashMap<String, String>,
}

impl VendorMatcher {
    /// Compile the vendor table from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, TallyError> {
        let patterns = config
            .vendor_patterns
            .iter()
            .map(|vendor| {
                RegexBuilder::new(&vendor.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (vendor.name.to_lowercase(), regex))
                    .map_err(|e| {
                        TallyError::Config(format!("invalid pattern for vendor {:?}: {}", vendor.name, e))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let categories = config
            .categories
            .iter()
            .map(|(vendor, category)| (vendor.to_lowercase(), category.clone()))
            .collect();

        Ok(Self { patterns, categories })
    }

    /// Category for a detected vendor, matched case-insensitively.
    pub fn category_for(&self, vendor: &str) -> &str {
        self.categories
            .get(&vendor.to_lowercase())
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

impl FieldRule for VendorMatcher {
    type Output = ExtractionMatch<String>;

    /// First configured vendor whose pattern matches, as its key.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns.iter().find_map(|(name, regex)| {
            regex
                .find(text)
                .map(|m| ExtractionMatch::new(name.clone(), m.as_str()))
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.patterns
            .iter()
            .filter_map(|(name, regex)| {
                regex
                    .find(text)
                    .map(|m| ExtractionMatch::new(name.clone(), m.as_str()))
            })
            .collect()
    }
}

/// Title-case words: a letter is upper-cased when the previous character
/// is not a letter, lower-cased otherwise (`"mcdonald's"` → `"Mcdonald'S"`).
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
