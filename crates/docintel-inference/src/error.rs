//! Error types for the inference layer.

use thiserror::Error;

/// Errors raised while loading or running an ONNX model.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The model bytes could not be turned into a session.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Session builder rejected an option.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// Input tensor could not be handed to the runtime.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The runtime failed while executing the graph.
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// An output had a shape or element type we cannot represent.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// Reading the model file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
