//! Document text acquisition.
//!
//! Turns uploaded bytes into receipt text. Files are validated up front and
//! rejected with a [`DocumentError`]; once accepted, extraction never fails
//! and degrades to a diagnostic placeholder instead.

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{DocumentError, Result};
use crate::models::config::DocumentConfig;

/// Something that can turn document bytes into text.
pub trait TextSource {
    /// Extract text from `bytes`, using `filename` to pick a decoder.
    ///
    /// Only a rejected file is an error; extraction problems come back as
    /// a diagnostic string.
    fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String>;
}

/// Broad kind of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
    Text,
    Unknown,
}

impl DocumentKind {
    /// Kind from the filename extension.
    pub fn from_filename(filename: &str) -> Self {
        match extension(filename).as_deref() {
            Some("jpg" | "jpeg" | "png" | "bmp") => DocumentKind::Image,
            Some("pdf") => DocumentKind::Pdf,
            Some("txt") => DocumentKind::Text,
            _ => DocumentKind::Unknown,
        }
    }
}

/// Lower-case extension without the dot.
fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Default [`TextSource`]: plain text, PDF text layers and image sniffing.
#[derive(Debug, Clone, Default)]
pub struct DocumentReader {
    config: DocumentConfig,
}

impl DocumentReader {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Reject empty, oversized or disallowed files.
    pub fn check_file(&self, bytes: &[u8], filename: &str) -> std::result::Result<(), DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        if bytes.len() > self.config.max_file_size {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                max: self.config.max_file_size,
            });
        }

        let ext = extension(filename).unwrap_or_default();
        if !self.config.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)) {
            return Err(DocumentError::UnsupportedType(format!(".{}", ext)));
        }

        Ok(())
    }

    // Err carries the diagnostic placeholder
    fn read_image(&self, bytes: &[u8]) -> std::result::Result<String, String> {
        match image::guess_format(bytes) {
            Ok(format) => {
                debug!("Recognised {:?} image", format);
                Err("OCR not available - image text extraction is not supported".to_string())
            }
            Err(e) => Err(format!("OCR failed: {}", e)),
        }
    }

    #[cfg(feature = "pdf")]
    fn read_pdf(&self, bytes: &[u8]) -> std::result::Result<String, String> {
        match PdfExtractor::load(bytes).and_then(|pdf| pdf.extract_text()) {
            Ok(text) if text.is_empty() => Err("No text in PDF".to_string()),
            Ok(text) => Ok(text),
            Err(e) => Err(format!("PDF extraction failed: {}", e)),
        }
    }

    #[cfg(not(feature = "pdf"))]
    fn read_pdf(&self, _bytes: &[u8]) -> std::result::Result<String, String> {
        Err("PDF processing not available - built without the pdf feature".to_string())
    }
}

impl TextSource for DocumentReader {
    fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String> {
        self.check_file(bytes, filename)?;

        let text = match DocumentKind::from_filename(filename) {
            DocumentKind::Image => self.read_image(bytes),
            DocumentKind::Pdf => self.read_pdf(bytes),
            DocumentKind::Text => Ok(decode_text(bytes)),
            DocumentKind::Unknown => Err(format!("Can't extract text from {}", filename)),
        };

        Ok(text.unwrap_or_else(|diagnostic| {
            warn!("Text extraction degraded for {}: {}", filename, diagnostic);
            diagnostic
        }))
    }
}

/// Decode text as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // every byte is a valid Latin-1 code point
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Hex SHA-256 of the document bytes, used for duplicate detection.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
