//! Receipt export documents.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::receipt::Receipt;

/// Version tag written into every export.
pub const EXPORT_VERSION: &str = "1.0";

/// A full JSON export of the receipt store.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub export_info: ExportInfo,
    pub summary_statistics: SummaryStatistics,
    pub receipts: Vec<Receipt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportInfo {
    pub timestamp: DateTime<Utc>,
    pub total_receipts: usize,
    pub currencies_detected: Vec<String>,
    pub languages_detected: Vec<String>,
    pub export_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStatistics {
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub categories: Vec<String>,
    pub vendors: Vec<String>,
}

impl ExportDocument {
    /// Build an export of `receipts` stamped with `timestamp`.
    ///
    /// Amounts are summed across currencies without conversion.
    pub fn new(receipts: Vec<Receipt>, timestamp: DateTime<Utc>) -> Self {
        let total_amount: Decimal = receipts.iter().map(Receipt::amount).sum();
        let average_amount = if receipts.is_empty() {
            Decimal::ZERO
        } else {
            total_amount / Decimal::from(receipts.len())
        };

        let distinct = |get: fn(&Receipt) -> &str| -> Vec<String> {
            receipts
                .iter()
                .map(|r| get(r).to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        Self {
            export_info: ExportInfo {
                timestamp,
                total_receipts: receipts.len(),
                currencies_detected: distinct(Receipt::currency),
                languages_detected: distinct(Receipt::language),
                export_version: EXPORT_VERSION.to_string(),
            },
            summary_statistics: SummaryStatistics {
                total_amount,
                average_amount,
                categories: distinct(Receipt::category),
                vendors: distinct(Receipt::vendor),
            },
            receipts,
        }
    }
}
