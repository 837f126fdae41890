//! The adapter contract shared by the PDF extractor and both OCR engines.

use crate::error::Result;

/// Something that turns the raw bytes of an uploaded file into text.
///
/// Callers validate the file type before dispatching; implementations report
/// malformed input through their error instead of re-checking extensions.
pub trait TextSource: Send + Sync {
    /// Short identifier used in logs and health output.
    fn name(&self) -> &'static str;

    /// Extract the text contained in `input`.
    fn extract(&self, input: &[u8]) -> Result<String>;
}
