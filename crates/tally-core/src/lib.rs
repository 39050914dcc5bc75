//! Core library for receipt tracking.
//!
//! This crate provides:
//! - Document text acquisition (plain text, PDF text layers)
//! - Heuristic receipt field extraction (vendor, amount, date, category)
//! - Receipt data model with validation and JSON/in-memory storage
//! - In-memory analytics: relevance search, partition sort, grouped and
//!   time-bucketed aggregation
//! - A processing pipeline composing the above for dashboards and reports

pub mod analytics;
pub mod document;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod record;
pub mod store;

pub use analytics::{AggregateFn, AggregationSpec, Period, SearchHit};
pub use document::{content_hash, DocumentReader, TextSource};
pub use error::{Result, TallyError};
pub use export::ExportDocument;
pub use extract::{ExtractedFields, FieldExtractor};
pub use models::config::TallyConfig;
pub use models::receipt::{Receipt, ReceiptDraft, ReceiptId, ReceiptUpdate};
pub use pipeline::{ProcessOutcome, ReceiptProcessor, Report};
pub use record::{FieldValue, Record, Row, Value};
pub use store::{JsonStore, MemoryStore, ReceiptFilter, ReceiptStore};
