//! ONNX inference abstraction for the docintel OCR models.
//!
//! The OCR pipeline in `docintel-core` talks to models only through the
//! [`InferenceBackend`] trait, so detection, classification and recognition
//! can be unit-tested against canned tensors. [`OrtBackend`] is the runtime
//! implementation on top of ONNX Runtime with the XNNPACK provider.

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use backend::ort::OrtBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor, TensorType};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
