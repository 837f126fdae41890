//! PDF text extraction.

mod extractor;

pub use extractor::{LoadedPdf, PdfTextExtractor};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;
