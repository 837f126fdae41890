//! Error types for the docintel-core library.

use thiserror::Error;

/// Main error type for the docintel library.
#[derive(Error, Debug)]
pub enum DocintelError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to parse the PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF parsed fine but carries no extractable text.
    #[error("no text could be extracted from the PDF")]
    NoText,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection failed.
    #[error("text detection failed: {0}")]
    Detection(String),

    /// Angle classification failed.
    #[error("angle classification failed: {0}")]
    Classification(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// The input bytes are not a decodable image.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors raised while running the validation conversation.
#[derive(Error, Debug)]
pub enum ConversationError {
    /// No LLM provider could be created.
    #[error("LLM provider '{provider}' is not configured: {reason}")]
    ProviderNotConfigured { provider: String, reason: String },

    /// The provider returned an error.
    #[error("LLM call failed: {0}")]
    Llm(String),

    /// The provider did not answer within the configured timeout.
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    /// The policy selected a role that cannot produce a reply.
    #[error("role '{0}' cannot produce a reply")]
    SilentRole(&'static str),
}

/// Result type for the docintel library.
pub type Result<T> = std::result::Result<T, DocintelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_display() {
        let err: DocintelError = PdfError::NoText.into();
        assert_eq!(err.to_string(), "PDF error: no text could be extracted from the PDF");
    }

    #[test]
    fn test_timeout_display() {
        let err = ConversationError::Timeout(120);
        assert!(err.to_string().contains("120s"));
    }

    #[test]
    fn test_provider_not_configured_display() {
        let err = ConversationError::ProviderNotConfigured {
            provider: "openai".into(),
            reason: "OPENAI_API_KEY not set".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("openai"), "got: {msg}");
        assert!(msg.contains("OPENAI_API_KEY"), "got: {msg}");
    }
}
