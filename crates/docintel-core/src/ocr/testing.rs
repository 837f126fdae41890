//! In-memory backend for exercising the pipeline without model files.

use std::collections::VecDeque;
use std::sync::Mutex;

use docintel_inference::{InferenceBackend, InferenceError, InputTensor, OutputTensor};
use ndarray::ArrayD;

/// Returns queued outputs in order, repeating the last one once the queue drains.
pub struct StaticBackend {
    outputs: Mutex<VecDeque<ArrayD<f32>>>,
    last: Mutex<Option<ArrayD<f32>>>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl StaticBackend {
    pub fn new(outputs: Vec<ArrayD<f32>>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            last: Mutex::new(None),
            input_names: vec!["x".to_string()],
            output_names: vec!["out".to_string()],
        }
    }
}

impl InferenceBackend for StaticBackend {
    fn run(
        &self,
        _inputs: &[(&str, InputTensor)],
    ) -> docintel_inference::Result<Vec<(String, OutputTensor)>> {
        let next = self.outputs.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        let output = match next {
            Some(output) => {
                *last = Some(output.clone());
                output
            }
            None => last
                .clone()
                .ok_or_else(|| InferenceError::InferenceFailed("no output queued".into()))?,
        };
        Ok(vec![("out".to_string(), OutputTensor::Float32(output))])
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}
