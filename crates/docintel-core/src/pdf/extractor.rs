//! PDF loading with lopdf and text extraction with pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::Result;
use crate::error::PdfError;
use crate::source::TextSource;

/// A parsed PDF ready for text extraction.
pub struct LoadedPdf {
    document: Document,
    /// Bytes handed to pdf-extract; the decrypted copy when the input was encrypted.
    raw_data: Vec<u8>,
}

impl LoadedPdf {
    /// Parse a PDF held in memory.
    ///
    /// Documents encrypted with an empty user password are decrypted
    /// transparently; any other encryption is rejected.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text of the whole document, pages in order.
    pub fn text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

/// [`TextSource`] for PDF uploads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text, failing when the document carries none.
    pub fn extract_text(&self, data: &[u8]) -> Result<String> {
        let pdf = LoadedPdf::load(data)?;
        let text = pdf.text()?;

        debug!("Extracted {} chars from {} pages", text.len(), pdf.page_count());

        if text.trim().is_empty() {
            return Err(PdfError::NoText);
        }
        Ok(text)
    }
}

impl TextSource for PdfTextExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extract(&self, input: &[u8]) -> crate::Result<String> {
        Ok(self.extract_text(input)?)
    }
}
