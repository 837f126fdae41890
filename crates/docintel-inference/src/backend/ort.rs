//! ONNX Runtime (ort) backend with the XNNPACK execution provider.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{ArrayD, IxDyn};
use ort::ep::XNNPACK;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use tracing::debug;

use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

/// Backend running a single ONNX model through ONNX Runtime.
///
/// `Session::run` needs `&mut`, so the session sits behind a mutex; concurrent
/// requests against the same model are serialised.
pub struct OrtBackend {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtBackend {
    /// Load a model file, using `threads` intra-op threads.
    pub fn from_file<P: AsRef<Path>>(path: P, threads: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ONNX model from: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, threads)
    }

    /// Load a model from memory, using `threads` intra-op threads.
    pub fn from_bytes(bytes: &[u8], threads: usize) -> Result<Self> {
        debug!("Creating ONNX session from {} bytes", bytes.len());

        let session = Session::builder()
            .map_err(session_err)?
            .with_execution_providers([XNNPACK::default().build()])
            .map_err(session_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(session_err)?
            .with_intra_threads(threads.max(1))
            .map_err(session_err)?
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        let input_names: Vec<String> = session.inputs().iter().map(|i| i.name().to_string()).collect();
        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();

        debug!("Model inputs: {:?}, outputs: {:?}", input_names, output_names);

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
        })
    }
}

fn session_err(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::SessionCreate(e.to_string())
}

fn to_ort_input(tensor: &InputTensor) -> Result<SessionInputValue<'static>> {
    let shape: Vec<i64> = tensor.shape().iter().map(|&s| s as i64).collect();
    let converted: std::result::Result<SessionInputValue<'static>, _> = match tensor {
        InputTensor::Float32(arr) => {
            Tensor::from_array((shape, arr.iter().cloned().collect::<Vec<f32>>())).map(Into::into)
        }
        InputTensor::Int64(arr) => {
            Tensor::from_array((shape, arr.iter().cloned().collect::<Vec<i64>>())).map(Into::into)
        }
    };
    converted.map_err(|e| InferenceError::InvalidInput(e.to_string()))
}

fn to_array<T: Clone>(shape: Vec<usize>, data: &[T]) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(&shape), data.to_vec())
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()))
}

impl InferenceBackend for OrtBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        let ort_inputs = inputs
            .iter()
            .map(|(name, tensor)| Ok((*name, to_ort_input(tensor)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::InferenceFailed(format!("session lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());
        for (name, value) in outputs.iter() {
            let tensor = if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                let dims = shape.iter().map(|&s| s as usize).collect();
                OutputTensor::Float32(to_array(dims, data)?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                let dims = shape.iter().map(|&s| s as usize).collect();
                OutputTensor::Int64(to_array(dims, data)?)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported element type for output '{}'",
                    name
                )));
            };
            results.push((name.to_string(), tensor));
        }

        Ok(results)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}
