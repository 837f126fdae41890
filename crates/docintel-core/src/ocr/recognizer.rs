//! Text recognition using the PaddleOCR CTC recognition model.

use std::path::Path;

use image::DynamicImage;
use ndarray::{ArrayView2, Axis, Ix2, s};
use tracing::{debug, trace};

use crate::error::OcrError;
use docintel_inference::{InferenceBackend, InputTensor};

use super::preprocessing::ImagePreprocessor;

/// Text recognizer over a CRNN/SVTR model with CTC output.
pub struct TextRecognizer<B: InferenceBackend> {
    backend: B,
    preprocessor: ImagePreprocessor,
    dictionary: Vec<char>,
}

/// Recognition result for a single text region.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub text: String,
    /// Mean per-character confidence (0.0 - 1.0).
    pub confidence: f32,
    pub char_scores: Vec<f32>,
}

impl<B: InferenceBackend> TextRecognizer<B> {
    /// `dictionary[0]` must be the CTC blank.
    pub fn new(backend: B, dictionary: Vec<char>) -> Self {
        Self {
            backend,
            preprocessor: ImagePreprocessor::new(),
            dictionary,
        }
    }

    /// Load a PaddleOCR dictionary file: one character per line.
    ///
    /// The returned table has the CTC blank at index 0 and a trailing space,
    /// matching models exported with `use_space_char`.
    pub fn load_dictionary(path: &Path) -> Result<Vec<char>, OcrError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OcrError::ModelLoad(format!("failed to read dictionary {}: {}", path.display(), e))
        })?;

        let mut chars = vec![' '];
        chars.extend(content.lines().filter_map(|line| line.chars().next()));
        chars.push(' ');

        debug!("Loaded dictionary with {} characters", chars.len());
        Ok(chars)
    }

    /// Built-in Latin table covering Spanish text, used when no dictionary file is present.
    pub fn default_latin_dictionary() -> Vec<char> {
        let mut chars = vec![' '];
        chars.extend('0'..='9');
        chars.extend('A'..='Z');
        chars.extend('a'..='z');
        chars.extend([
            'Á', 'á', 'É', 'é', 'Í', 'í', 'Ó', 'ó', 'Ú', 'ú', 'Ü', 'ü', 'Ñ', 'ñ', '¿', '¡', 'ç',
            'Ç', 'º', 'ª',
        ]);
        chars.extend([
            '.', ',', ';', ':', '!', '?', '-', '_', '/', '\\', '(', ')', '[', ']', '{', '}', '<',
            '>', '@', '#', '$', '%', '&', '*', '+', '=', '|', '\'', '"', '€', '°',
        ]);
        chars.push(' ');
        chars
    }

    /// Recognize the text in a cropped, upright region.
    pub fn recognize(&self, image: &DynamicImage) -> Result<RecognitionResult, OcrError> {
        let tensor = self.preprocessor.recognition_input(image);

        let output = self
            .backend
            .run_single_f32(InputTensor::Float32(tensor.into_dyn()))
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        if output.ndim() != 3 {
            return Err(OcrError::Recognition(format!(
                "expected [1, T, classes] output, got shape {:?}",
                output.shape()
            )));
        }

        let steps = output
            .slice(s![0, .., ..])
            .into_dimensionality::<Ix2>()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        let result = ctc_greedy_decode(steps, &self.dictionary);
        trace!("Recognized: '{}' (confidence: {:.3})", result.text, result.confidence);
        Ok(result)
    }
}

/// Greedy CTC decoding over a `[T, classes]` score matrix.
///
/// Takes the argmax per step, drops blanks (index 0) and repeats. Rows that do
/// not already sum to one are treated as logits and softmaxed for confidence.
pub fn ctc_greedy_decode(steps: ArrayView2<'_, f32>, dictionary: &[char]) -> RecognitionResult {
    let mut text = String::new();
    let mut char_scores = Vec::new();
    let mut prev = 0usize;

    for row in steps.axis_iter(Axis(0)) {
        let (idx, max) = row
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });

        if idx != 0 && idx != prev {
            if let Some(&c) = dictionary.get(idx) {
                let sum: f32 = row.sum();
                let probability = if (sum - 1.0).abs() < 1e-3 && max >= 0.0 {
                    max
                } else {
                    1.0 / row.iter().map(|v| (v - max).exp()).sum::<f32>()
                };
                text.push(c);
                char_scores.push(probability);
            }
        }
        prev = idx;
    }

    let confidence = if char_scores.is_empty() {
        0.0
    } else {
        char_scores.iter().sum::<f32>() / char_scores.len() as f32
    };

    RecognitionResult {
        text,
        confidence,
        char_scores,
    }
}
