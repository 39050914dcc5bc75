//! Rule-based field extractors for receipts.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod vendors;

pub use amounts::AmountRule;
pub use dates::{DateFormat, DateRule, DATE_FORMATS};
pub use vendors::{title_case, VendorMatcher};

/// Trait for single-field extraction rules.
pub trait FieldRule {
    /// The type of value this rule produces.
    type Output;

    /// Extract the preferred value from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract every candidate value, in discovery order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in receipt text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}
