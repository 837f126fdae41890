//! Inference backend implementations.

pub mod ort;

use crate::{InputTensor, OutputTensor, Result};

/// A loaded ONNX model that can be executed.
///
/// Implementations must be shareable across request threads; the OCR engines
/// hold them behind an `Arc` for the lifetime of the server.
pub trait InferenceBackend: Send + Sync {
    /// Run the model with named inputs, returning named outputs in graph order.
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Input names declared by the model.
    fn input_names(&self) -> &[String];

    /// Output names declared by the model.
    fn output_names(&self) -> &[String];

    /// Run a single-input model and return its first output as `f32`.
    ///
    /// Every PaddleOCR graph used by docintel has this shape: one image tensor
    /// in, one score tensor out.
    fn run_single_f32(&self, input: InputTensor) -> Result<ndarray::ArrayD<f32>> {
        let name = self
            .input_names()
            .first()
            .cloned()
            .unwrap_or_else(|| "x".to_string());

        let (output_name, output) = self
            .run(&[(name.as_str(), input)])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                crate::InferenceError::OutputExtraction("model produced no outputs".to_string())
            })?;

        output.into_f32().ok_or_else(|| {
            crate::InferenceError::OutputExtraction(format!(
                "output '{}' is not a float tensor",
                output_name
            ))
        })
    }
}
