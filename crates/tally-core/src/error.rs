//! Error types for the tally-core library.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::receipt::ReceiptId;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Receipt construction or correction was rejected.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The uploaded document was rejected before text extraction.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Storage collaborator failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Analytics input error.
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while constructing or correcting a receipt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory text field is empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Amounts are never negative.
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// Amount text is not a decimal number.
    #[error("amount is not a number: {0:?}")]
    InvalidAmount(String),

    /// Date is not a valid `YYYY-MM-DD` calendar date.
    #[error("date must be in YYYY-MM-DD format, got {0:?}")]
    InvalidDate(String),
}

/// Errors raised when an uploaded document is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// No bytes were supplied.
    #[error("file is empty")]
    Empty,

    /// The document exceeds the configured size limit.
    #[error("file too big ({size} bytes, limit is {max})")]
    TooLarge { size: usize, max: usize },

    /// The file extension is not accepted.
    #[error("file type {0:?} not supported")]
    UnsupportedType(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors reported by a receipt store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No receipt with this identifier.
    #[error("receipt {0} not found")]
    NotFound(ReceiptId),

    /// A receipt with the same content hash is already stored.
    #[error("duplicate of receipt {existing}")]
    Duplicate { existing: ReceiptId },

    /// Backing file could not be read or written.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file is not valid store JSON.
    #[error("store data is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised by the analytics layer for malformed requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// At least one record lacks the requested sort field.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Aggregate function name is not one of sum, avg, count.
    #[error("unknown aggregate function: {0}")]
    UnknownAggregate(String),

    /// Period name is not one of day, week, month.
    #[error("unknown period: {0}")]
    UnknownPeriod(String),
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
