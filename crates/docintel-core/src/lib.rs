//! Core library for docintel.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract)
//! - Two OCR engines: a PaddleOCR pipeline over ONNX Runtime and `pure-onnx-ocr`
//! - A supervisor/validator LLM conversation over OCR output
//! - Service configuration

pub mod conversation;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod prompts;
pub mod source;

pub use conversation::{ChatModel, ConversationRunner, ProviderChatModel, Role, Transcript};
pub use error::{ConversationError, DocintelError, OcrError, PdfError, Result};
pub use models::{ConversationConfig, DocintelConfig, ModelConfig, OcrConfig, ServerConfig};
pub use ocr::{OcrEngine, OcrResult, PureOcrEngine, TextBox};
pub use pdf::PdfTextExtractor;
pub use source::TextSource;

/// Re-export inference types.
pub use docintel_inference::{InferenceBackend, InputTensor, OrtBackend, OutputTensor};
