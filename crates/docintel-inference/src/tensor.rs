//! Tensor types exchanged with inference backends.
//!
//! The PaddleOCR models consumed by docintel take a single `f32` NCHW image
//! tensor and produce `f32` maps (some exported graphs emit `i64` indices), so
//! only those two element types are modelled.

use ndarray::{ArrayD, IxDyn};

use crate::{InferenceError, Result};

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    Float32,
    Int64,
}

/// Input tensor for inference.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(ArrayD<f32>),
    Int64(ArrayD<i64>),
}

impl InputTensor {
    /// Build a Float32 tensor from flat data and a shape.
    pub fn from_f32(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(InputTensor::Float32)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
            InputTensor::Int64(arr) => arr.shape(),
        }
    }

    pub fn dtype(&self) -> TensorType {
        match self {
            InputTensor::Float32(_) => TensorType::Float32,
            InputTensor::Int64(_) => TensorType::Int64,
        }
    }
}

/// Output tensor from inference.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Int64(ArrayD<i64>),
}

impl OutputTensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Int64(arr) => arr.shape(),
        }
    }

    pub fn dtype(&self) -> TensorType {
        match self {
            OutputTensor::Float32(_) => TensorType::Float32,
            OutputTensor::Int64(_) => TensorType::Int64,
        }
    }

    /// Consume the tensor, returning the `f32` array if that is what it holds.
    pub fn into_f32(self) -> Option<ArrayD<f32>> {
        match self {
            OutputTensor::Float32(arr) => Some(arr),
            OutputTensor::Int64(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_f32_shape() {
        let tensor = InputTensor::from_f32(vec![0.0; 6], &[1, 2, 3]).unwrap();
        assert_eq!(tensor.shape(), &[1, 2, 3]);
        assert_eq!(tensor.dtype(), TensorType::Float32);
    }

    #[test]
    fn test_from_f32_shape_mismatch() {
        let err = InputTensor::from_f32(vec![0.0; 5], &[2, 3]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidInput(_)));
    }

    #[test]
    fn test_output_into_f32() {
        let arr = ArrayD::from_elem(IxDyn(&[2]), 1i64);
        assert!(OutputTensor::Int64(arr).into_f32().is_none());

        let arr = ArrayD::from_elem(IxDyn(&[2]), 0.5f32);
        let out = OutputTensor::Float32(arr).into_f32().unwrap();
        assert_eq!(out.len(), 2);
    }
}
