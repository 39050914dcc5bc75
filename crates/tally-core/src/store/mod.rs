//! Receipt storage.
//!
//! The pipeline only talks to the [`ReceiptStore`] trait. Two backends are
//! provided: [`MemoryStore`] for tests and one-shot runs, and [`JsonStore`]
//! which persists to a single JSON file.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::receipt::{Receipt, ReceiptId, ReceiptUpdate};

/// Create/read/update/delete access to stored receipts.
pub trait ReceiptStore {
    /// Store a new receipt and return its identifier.
    ///
    /// Fails with `StoreError::Duplicate` when a receipt with the same
    /// content hash exists.
    fn create(&mut self, receipt: Receipt) -> Result<ReceiptId>;

    /// Fetch one receipt.
    fn get(&self, id: ReceiptId) -> Result<Receipt>;

    /// Receipts matching `filter`, newest date first.
    fn list(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>>;

    /// Apply a correction and return the updated receipt.
    fn update(&mut self, id: ReceiptId, update: &ReceiptUpdate) -> Result<Receipt>;

    fn delete(&mut self, id: ReceiptId) -> Result<()>;

    /// Identifier of a stored receipt with this content hash.
    fn check_duplicate(&self, content_hash: &str) -> Result<Option<ReceiptId>>;

    /// Remove every receipt.
    fn clear(&mut self) -> Result<()>;
}

/// Criteria for listing receipts. Unset criteria match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptFilter {
    /// Substring of filename, text or vendor, ignoring case.
    pub keyword: Option<String>,
    /// Substring of the vendor, ignoring case.
    pub vendor: Option<String>,
    /// Substring of the category, ignoring case.
    pub category: Option<String>,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ReceiptFilter {
    /// Match everything, returning at most `limit` receipts.
    pub fn limited(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn matches(&self, receipt: &Receipt) -> bool {
        if let Some(keyword) = &self.keyword {
            let hit = [receipt.filename(), receipt.text(), receipt.vendor()]
                .iter()
                .any(|field| contains_ignore_case(field, keyword));
            if !hit {
                return false;
            }
        }
        if let Some(vendor) = &self.vendor {
            if !contains_ignore_case(receipt.vendor(), vendor) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !contains_ignore_case(receipt.category(), category) {
                return false;
            }
        }
        if let Some(currency) = &self.currency {
            if !receipt.currency().eq_ignore_ascii_case(currency) {
                return false;
            }
        }
        if let Some(language) = &self.language {
            if !receipt.language().eq_ignore_ascii_case(language) {
                return false;
            }
        }

        self.date_from.is_none_or(|from| receipt.date() >= from)
            && self.date_to.is_none_or(|to| receipt.date() <= to)
            && self.amount_min.is_none_or(|min| receipt.amount() >= min)
            && self.amount_max.is_none_or(|max| receipt.amount() <= max)
    }

    /// Filter, order by date descending, then page.
    pub fn apply<'a, I>(&self, receipts: I) -> Vec<Receipt>
    where
        I: IntoIterator<Item = &'a Receipt>,
    {
        let mut matched: Vec<&Receipt> = receipts.into_iter().filter(|r| self.matches(r)).collect();
        matched.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.id().cmp(&a.id())));

        matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
