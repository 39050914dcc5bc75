//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A loaded PDF ready for text extraction.
pub struct PdfExtractor {
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Parse a PDF from bytes.
    ///
    /// Documents encrypted with an empty user password are decrypted; any
    /// other encryption is rejected.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract works on bytes, so re-serialize the decrypted document
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { raw_data })
    }

    /// Text of every page, trimmed.
    pub fn extract_text(&self) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(text.trim().to_string())
    }
}
