//! 0°/180° angle classification for text regions.

use image::DynamicImage;
use tracing::trace;

use crate::error::OcrError;
use docintel_inference::{InferenceBackend, InputTensor};

use super::preprocessing::ImagePreprocessor;

/// Angle classifier for detecting upside-down text.
pub struct AngleClassifier<B: InferenceBackend> {
    backend: B,
    preprocessor: ImagePreprocessor,
    threshold: f32,
}

impl<B: InferenceBackend> AngleClassifier<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            preprocessor: ImagePreprocessor::new(),
            threshold: 0.9,
        }
    }

    /// Minimum confidence before a region is flipped.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Classify the angle of a text region.
    ///
    /// Returns (angle, confidence) where angle is 0 or 180.
    pub fn classify(&self, image: &DynamicImage) -> Result<(i32, f32), OcrError> {
        let tensor = self.preprocessor.classification_input(image);

        let output = self
            .backend
            .run_single_f32(InputTensor::Float32(tensor.into_dyn()))
            .map_err(|e| OcrError::Classification(e.to_string()))?;

        // [1, 2]: probabilities for 0° and 180°
        let probs: Vec<f32> = output.iter().copied().collect();
        let (angle, confidence) = match probs.as_slice() {
            [upright, flipped, ..] if flipped > upright => (180, *flipped),
            [upright, _, ..] => (0, *upright),
            _ => {
                return Err(OcrError::Classification(format!(
                    "expected two class scores, got shape {:?}",
                    output.shape()
                )));
            }
        };

        trace!("Classified angle: {}° (confidence: {:.3})", angle, confidence);
        Ok((angle, confidence))
    }

    /// Rotate the crop when it is confidently upside down; returns the applied angle.
    pub fn auto_rotate(&self, image: DynamicImage) -> Result<(DynamicImage, i32), OcrError> {
        let (angle, confidence) = self.classify(&image)?;
        if angle == 180 && confidence >= self.threshold {
            Ok((image.rotate180(), 180))
        } else {
            Ok((image, 0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::testing::StaticBackend;
    use image::RgbImage;
    use ndarray::arr2;

    fn crop() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(40, 10))
    }

    #[test]
    fn test_classify_picks_most_likely_angle() {
        let backend = StaticBackend::new(vec![arr2(&[[0.2f32, 0.8]]).into_dyn()]);
        let (angle, confidence) = AngleClassifier::new(backend).classify(&crop()).unwrap();
        assert_eq!(angle, 180);
        assert!((confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_auto_rotate_respects_threshold() {
        let backend = StaticBackend::new(vec![arr2(&[[0.2f32, 0.8]]).into_dyn()]);
        let classifier = AngleClassifier::new(backend).with_threshold(0.9);
        let (_, angle) = classifier.auto_rotate(crop()).unwrap();
        assert_eq!(angle, 0);

        let backend = StaticBackend::new(vec![arr2(&[[0.02f32, 0.98]]).into_dyn()]);
        let classifier = AngleClassifier::new(backend).with_threshold(0.9);
        let (_, angle) = classifier.auto_rotate(crop()).unwrap();
        assert_eq!(angle, 180);
    }

    #[test]
    fn test_single_score_is_an_error() {
        let backend = StaticBackend::new(vec![arr2(&[[1.0f32]]).into_dyn()]);
        let err = AngleClassifier::new(backend).classify(&crop()).unwrap_err();
        assert!(matches!(err, OcrError::Classification(_)));
    }
}
