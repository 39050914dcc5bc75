//! Receipt field extraction.

mod parser;
pub mod rules;

pub use parser::{filename_vendor, ExtractedFields, ExtractionResult, FieldExtractor, MAX_VENDOR_LEN};
