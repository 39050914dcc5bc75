//! Receipt processing pipeline.
//!
//! Ties the pieces together: document text goes through the
//! [`FieldExtractor`], becomes a [`Receipt`] and is handed to a
//! [`ReceiptStore`]. Analytics views are computed on demand from the stored
//! receipts with the algorithms in [`crate::analytics`].

use chrono::{Local, NaiveDate, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::analytics::{
    aggregate_by_period, aggregation_spec, group_and_aggregate, keyword_search, median, mode, quicksort,
    AggregateFn, GroupResult, Period, SearchHit,
};
use crate::document::{content_hash, DocumentReader, TextSource};
use crate::error::{Result, StoreError, TallyError};
use crate::export::ExportDocument;
use crate::extract::{ExtractedFields, FieldExtractor};
use crate::models::config::{AnalyticsConfig, ReceiptDefaults, TallyConfig};
use crate::models::receipt::{Receipt, ReceiptDraft, ReceiptId, ReceiptUpdate, DATE_FORMAT};
use crate::record::{FieldValue, Record};
use crate::store::{ReceiptFilter, ReceiptStore};

/// Outcome of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<ReceiptId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ExtractedFields>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessOutcome {
    fn failed(filename: &str, error: impl ToString) -> Self {
        Self {
            filename: filename.to_string(),
            success: false,
            receipt_id: None,
            extracted: None,
            warnings: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// An analytics response: data, an explicit "nothing to report", or an
/// error object in place of a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report<T> {
    Data(T),
    NoData,
    Failed { error: String },
}

impl<T> Report<T> {
    pub fn into_data(self) -> Option<T> {
        match self {
            Report::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Report::NoData)
    }
}

/// Spending per category, highest total first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInsights {
    pub category_insights: Vec<CategoryInsight>,
    pub total_categories: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInsight {
    pub category: String,
    pub total_spent: Decimal,
    pub average_amount: Decimal,
    pub transaction_count: Decimal,
}

/// Spending per vendor, highest total first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorInsights {
    pub vendor_insights: Vec<VendorInsight>,
    pub total_vendors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorInsight {
    pub vendor: String,
    pub total_spent: Decimal,
    pub average_amount: Decimal,
    pub visit_count: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorTotal {
    pub vendor: String,
    pub total_spent: Decimal,
}

impl Record for CategoryInsight {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "category" => Some(FieldValue::Text(&self.category)),
            "total_spent" => Some(FieldValue::Number(self.total_spent)),
            "average_amount" => Some(FieldValue::Number(self.average_amount)),
            "transaction_count" => Some(FieldValue::Number(self.transaction_count)),
            _ => None,
        }
    }
}

impl Record for VendorInsight {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "vendor" => Some(FieldValue::Text(&self.vendor)),
            "total_spent" => Some(FieldValue::Number(self.total_spent)),
            "average_amount" => Some(FieldValue::Number(self.average_amount)),
            "visit_count" => Some(FieldValue::Number(self.visit_count)),
            _ => None,
        }
    }
}

impl Record for VendorTotal {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "vendor" => Some(FieldValue::Text(&self.vendor)),
            "total_spent" => Some(FieldValue::Number(self.total_spent)),
            _ => None,
        }
    }
}

/// Store-wide spending figures, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub total_receipts: usize,
    pub total_spent: Decimal,
    pub avg_amount: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
    pub median_spend: Decimal,
}

/// Aggregate analytics over receipts with a non-zero amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingAnalytics {
    pub total_receipts: usize,
    pub total_spending: Decimal,
    pub average_spending: Decimal,
    pub median_spending: Decimal,
    pub most_common_category: Option<String>,
    pub category_breakdown: IndexMap<String, GroupResult>,
    pub vendor_breakdown: IndexMap<String, GroupResult>,
    pub monthly_spending: IndexMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: SpendingSummary,
    pub recent_receipts: Vec<Receipt>,
    pub top_vendors: Vec<VendorTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencyTotal {
    pub total: Decimal,
    pub count: usize,
}

/// Main receipt processor.
pub struct ReceiptProcessor<S, T = DocumentReader> {
    store: S,
    source: T,
    extractor: FieldExtractor,
    defaults: ReceiptDefaults,
    analytics: AnalyticsConfig,
}

impl<S: ReceiptStore> ReceiptProcessor<S, DocumentReader> {
    /// Processor reading documents with a [`DocumentReader`] built from
    /// `config`.
    pub fn from_config(store: S, config: &TallyConfig) -> Result<Self> {
        Self::new(store, DocumentReader::new(config.documents.clone()), config)
    }
}

impl<S: ReceiptStore, T: TextSource> ReceiptProcessor<S, T> {
    pub fn new(store: S, source: T, config: &TallyConfig) -> Result<Self> {
        Ok(Self {
            store,
            source,
            extractor: FieldExtractor::from_config(&config.extraction)?,
            defaults: config.defaults.clone(),
            analytics: config.analytics.clone(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Extract, build and store a receipt from document bytes.
    ///
    /// Failures are reported in the outcome, never raised.
    pub fn process_document(&mut self, bytes: &[u8], filename: &str) -> ProcessOutcome {
        self.process_document_on(bytes, filename, Local::now().date_naive())
    }

    /// Like [`process_document`](Self::process_document) with an explicit
    /// fallback date for receipts whose date cannot be found.
    pub fn process_document_on(&mut self, bytes: &[u8], filename: &str, today: NaiveDate) -> ProcessOutcome {
        match self.ingest(bytes, filename, today) {
            Ok((id, fields, warnings)) => {
                info!("Processed {} as receipt {} ({} {})", filename, id, fields.vendor, fields.amount);
                ProcessOutcome {
                    filename: filename.to_string(),
                    success: true,
                    receipt_id: Some(id),
                    extracted: Some(fields),
                    warnings,
                    error: None,
                }
            }
            Err(e) => {
                error!("Processing failed for {}: {}", filename, e);
                ProcessOutcome::failed(filename, e)
            }
        }
    }

    fn ingest(
        &mut self,
        bytes: &[u8],
        filename: &str,
        today: NaiveDate,
    ) -> Result<(ReceiptId, ExtractedFields, Vec<String>)> {
        let text = self.source.extract_text(bytes, filename)?;

        let hash = content_hash(bytes);
        if let Some(existing) = self.store.check_duplicate(&hash)? {
            return Err(StoreError::Duplicate { existing }.into());
        }

        let result = self.extractor.parse(&text, filename, today);
        debug!("Extraction of {} took {}ms", filename, result.processing_time_ms);
        let fields = result.fields;

        let receipt = ReceiptDraft {
            category: Some(fields.category.clone()),
            text,
            currency: Some(self.defaults.currency.clone()),
            language: Some(self.defaults.language.clone()),
            content_hash: hash,
            ..Receipt::draft(
                filename,
                fields.vendor.clone(),
                fields.date.format(DATE_FORMAT).to_string(),
                fields.amount,
            )
        }
        .build()?;

        let id = self.store.create(receipt)?;
        Ok((id, fields, result.warnings))
    }

    /// Process several documents; one outcome per document, in order.
    pub fn process_batch<I, B, N>(&mut self, documents: I) -> Vec<ProcessOutcome>
    where
        I: IntoIterator<Item = (B, N)>,
        B: AsRef<[u8]>,
        N: AsRef<str>,
    {
        let outcomes: Vec<ProcessOutcome> = documents
            .into_iter()
            .map(|(bytes, name)| self.process_document(bytes.as_ref(), name.as_ref()))
            .collect();

        let failed = outcomes.iter().filter(|o| !o.success).count();
        if failed > 0 {
            warn!("{} of {} documents failed", failed, outcomes.len());
        }
        outcomes
    }

    pub fn get(&self, id: ReceiptId) -> Result<Receipt> {
        self.store.get(id)
    }

    /// Receipts matching `filter`, newest first.
    pub fn list(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>> {
        self.store.list(filter)
    }

    /// Apply a manual correction.
    pub fn correct(&mut self, id: ReceiptId, update: &ReceiptUpdate) -> Result<Receipt> {
        let receipt = self.store.update(id, update)?;
        info!("Corrected receipt {}", id);
        Ok(receipt)
    }

    pub fn delete(&mut self, id: ReceiptId) -> Result<()> {
        self.store.delete(id)?;
        info!("Deleted receipt {}", id);
        Ok(())
    }

    fn fetch(&self) -> Result<Vec<Receipt>> {
        self.store.list(&ReceiptFilter::limited(self.analytics.fetch_limit))
    }

    /// Rank stored receipts against `query`.
    pub fn search(&self, query: &str) -> Vec<SearchHit<Receipt>> {
        match self.fetch() {
            Ok(receipts) => {
                let mut hits = keyword_search(&receipts, query, &self.analytics.search_fields);
                hits.truncate(self.analytics.search_limit);
                hits
            }
            Err(e) => {
                error!("Search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Stored receipts sorted by `field`. Empty on failure.
    pub fn sorted_view(&self, field: &str, ascending: bool) -> Vec<Receipt> {
        let sorted = self
            .fetch()
            .and_then(|receipts| quicksort(&receipts, field, ascending).map_err(TallyError::from));

        sorted.unwrap_or_else(|e| {
            error!("Sorting failed: {}", e);
            Vec::new()
        })
    }

    pub fn category_insights(&self) -> Report<CategoryInsights> {
        self.report("Category insights", |receipts| {
            let spec = aggregation_spec(&[("amount", &[AggregateFn::Sum, AggregateFn::Avg, AggregateFn::Count])]);
            let rows: Vec<CategoryInsight> = group_and_aggregate(receipts, "category", &spec)
                .into_iter()
                .map(|(category, stats)| CategoryInsight {
                    category,
                    total_spent: stat(&stats, "amount_sum"),
                    average_amount: stat(&stats, "amount_avg"),
                    transaction_count: stat(&stats, "amount_count"),
                })
                .collect();

            let sorted = quicksort(&rows, "total_spent", false)?;
            Ok(CategoryInsights {
                total_categories: sorted.len(),
                category_insights: sorted,
            })
        })
    }

    pub fn vendor_insights(&self) -> Report<VendorInsights> {
        self.report("Vendor insights", |receipts| {
            let spec = aggregation_spec(&[("amount", &[AggregateFn::Sum, AggregateFn::Avg, AggregateFn::Count])]);
            let rows: Vec<VendorInsight> = group_and_aggregate(receipts, "vendor", &spec)
                .into_iter()
                .map(|(vendor, stats)| VendorInsight {
                    vendor,
                    total_spent: stat(&stats, "amount_sum"),
                    average_amount: stat(&stats, "amount_avg"),
                    visit_count: stat(&stats, "amount_count"),
                })
                .collect();

            let sorted = quicksort(&rows, "total_spent", false)?;
            Ok(VendorInsights {
                total_vendors: sorted.len(),
                vendor_insights: sorted,
            })
        })
    }

    /// Vendors with the highest total spend.
    pub fn top_vendors(&self, count: usize) -> Result<Vec<VendorTotal>> {
        let receipts = self.fetch()?;
        top_vendors(&receipts, count)
    }

    /// Spending per calendar month.
    pub fn monthly_spending(&self) -> Report<IndexMap<String, Decimal>> {
        self.spending_by_period(Period::Month)
    }

    /// Spending per calendar period, oldest first.
    pub fn spending_by_period(&self, period: Period) -> Report<IndexMap<String, Decimal>> {
        self.report("Period spending", |receipts| {
            Ok(aggregate_by_period(receipts, "date", "amount", period))
        })
    }

    /// Summary over every stored receipt. An empty store reports zeros.
    pub fn spending_summary(&self) -> Report<SpendingSummary> {
        match self.store.list(&ReceiptFilter::default()) {
            Ok(receipts) => Report::Data(spending_summary(&receipts)),
            Err(e) => {
                error!("Summary failed: {}", e);
                Report::Failed {
                    error: "Could not get summary".to_string(),
                }
            }
        }
    }

    pub fn spending_analytics(&self) -> Report<SpendingAnalytics> {
        self.report("Analytics", |receipts| {
            let amounts: Vec<Decimal> = receipts
                .iter()
                .map(Receipt::amount)
                .filter(|amount| !amount.is_zero())
                .collect();
            let total: Decimal = amounts.iter().sum();
            let average = if amounts.is_empty() {
                Decimal::ZERO
            } else {
                total / Decimal::from(amounts.len())
            };

            let spec = aggregation_spec(&[("amount", &[AggregateFn::Sum, AggregateFn::Avg, AggregateFn::Count])]);

            Ok(SpendingAnalytics {
                total_receipts: receipts.len(),
                total_spending: total,
                average_spending: average,
                median_spending: median(&amounts),
                most_common_category: mode(receipts.iter().map(Receipt::category)).map(str::to_string),
                category_breakdown: group_and_aggregate(receipts, "category", &spec),
                vendor_breakdown: group_and_aggregate(receipts, "vendor", &spec),
                monthly_spending: aggregate_by_period(receipts, "date", "amount", Period::Month),
            })
        })
    }

    /// Summary, most recent receipts and top vendors.
    pub fn dashboard(&self) -> Report<Dashboard> {
        let dashboard = || -> Result<Dashboard> {
            let all = self.store.list(&ReceiptFilter::default())?;
            let recent = self.store.list(&ReceiptFilter::limited(self.analytics.recent_limit))?;
            let top = top_vendors(&self.fetch()?, self.analytics.top_vendors)?;

            Ok(Dashboard {
                summary: spending_summary(&all),
                recent_receipts: recent,
                top_vendors: top,
            })
        };

        dashboard().map(Report::Data).unwrap_or_else(|e| {
            error!("Dashboard data failed: {}", e);
            Report::Failed {
                error: "Could not load dashboard data".to_string(),
            }
        })
    }

    /// Total and receipt count per currency, in first-seen order.
    pub fn currency_summary(&self) -> Report<IndexMap<String, CurrencyTotal>> {
        self.report("Currency summary", |receipts| {
            let mut totals: IndexMap<String, CurrencyTotal> = IndexMap::new();
            for receipt in receipts {
                let entry = totals.entry(receipt.currency().to_string()).or_default();
                entry.total += receipt.amount();
                entry.count += 1;
            }
            Ok(totals)
        })
    }

    /// Everything in the store as an export document.
    pub fn export(&self) -> Result<ExportDocument> {
        let receipts = self.store.list(&ReceiptFilter::default())?;
        Ok(ExportDocument::new(receipts, Utc::now()))
    }

    /// Run an analytics view over the fetched receipts, degrading to
    /// `NoData` for an empty store and `Failed` on error.
    fn report<R, F>(&self, name: &str, view: F) -> Report<R>
    where
        F: FnOnce(&[Receipt]) -> Result<R>,
    {
        let result = self.fetch().and_then(|receipts| {
            if receipts.is_empty() {
                return Ok(None);
            }
            view(&receipts).map(Some)
        });

        match result {
            Ok(Some(data)) => Report::Data(data),
            Ok(None) => Report::NoData,
            Err(e) => {
                error!("{} failed: {}", name, e);
                Report::Failed {
                    error: format!("Could not generate {}", name.to_lowercase()),
                }
            }
        }
    }
}

fn stat(stats: &GroupResult, key: &str) -> Decimal {
    stats.get(key).copied().unwrap_or(Decimal::ZERO)
}

fn top_vendors(receipts: &[Receipt], count: usize) -> Result<Vec<VendorTotal>> {
    let spec = aggregation_spec(&[("amount", &[AggregateFn::Sum])]);
    let totals: Vec<VendorTotal> = group_and_aggregate(receipts, "vendor", &spec)
        .into_iter()
        .map(|(vendor, stats)| VendorTotal {
            vendor,
            total_spent: stat(&stats, "amount_sum"),
        })
        .collect();

    let mut sorted = quicksort(&totals, "total_spent", false)?;
    sorted.truncate(count);
    Ok(sorted)
}

fn spending_summary(receipts: &[Receipt]) -> SpendingSummary {
    let amounts: Vec<Decimal> = receipts.iter().map(Receipt::amount).collect();
    let total: Decimal = amounts.iter().sum();
    let average = if amounts.is_empty() {
        Decimal::ZERO
    } else {
        total / Decimal::from(amounts.len())
    };

    SpendingSummary {
        total_receipts: receipts.len(),
        total_spent: total.round_dp(2),
        avg_amount: average.round_dp(2),
        min_amount: amounts.iter().min().copied().unwrap_or_default().round_dp(2),
        max_amount: amounts.iter().max().copied().unwrap_or_default().round_dp(2),
        earliest_date: receipts.iter().map(Receipt::date).min(),
        latest_date: receipts.iter().map(Receipt::date).max(),
        median_spend: median(&amounts).round_dp(2),
    }
}
