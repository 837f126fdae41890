//! PaddleOCR pipeline: detection, optional angle classification, recognition.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};
use crate::source::TextSource;
use docintel_inference::{InferenceBackend, OrtBackend};

use super::{
    OcrResult, TextBox, classifier::AngleClassifier, decode_image, detector::TextDetector,
    preprocessing::ImagePreprocessor, recognizer::TextRecognizer,
};

/// OCR engine combining detection, classification, and recognition.
pub struct OcrEngine<B: InferenceBackend> {
    detector: TextDetector<B>,
    classifier: Option<AngleClassifier<B>>,
    recognizer: TextRecognizer<B>,
    preprocessor: ImagePreprocessor,
    config: OcrConfig,
}

/// Builder for [`OcrEngine`].
pub struct OcrEngineBuilder<B: InferenceBackend> {
    detector: Option<TextDetector<B>>,
    classifier: Option<AngleClassifier<B>>,
    recognizer: Option<TextRecognizer<B>>,
    config: OcrConfig,
}

impl<B: InferenceBackend> OcrEngineBuilder<B> {
    pub fn new() -> Self {
        Self {
            detector: None,
            classifier: None,
            recognizer: None,
            config: OcrConfig::default(),
        }
    }

    pub fn with_detector(mut self, detector: TextDetector<B>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_classifier(mut self, classifier: AngleClassifier<B>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_recognizer(mut self, recognizer: TextRecognizer<B>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_config(mut self, config: OcrConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine; detection and recognition are mandatory.
    pub fn build(self) -> Result<OcrEngine<B>, OcrError> {
        let detector = self
            .detector
            .ok_or_else(|| OcrError::ModelLoad("no text detector configured".to_string()))?;
        let recognizer = self
            .recognizer
            .ok_or_else(|| OcrError::ModelLoad("no text recognizer configured".to_string()))?;

        let classifier = if self.config.enable_classification {
            self.classifier
        } else {
            None
        };

        Ok(OcrEngine {
            detector: detector
                .with_threshold(self.config.detection_threshold)
                .with_box_threshold(self.config.box_threshold)
                .with_unclip_ratio(self.config.unclip_ratio),
            classifier: classifier.map(|c| c.with_threshold(self.config.classification_threshold)),
            recognizer,
            preprocessor: ImagePreprocessor::new().with_max_size(self.config.max_image_size),
            config: self.config,
        })
    }
}

impl<B: InferenceBackend> Default for OcrEngineBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: InferenceBackend> OcrEngine<B> {
    pub fn builder() -> OcrEngineBuilder<B> {
        OcrEngineBuilder::new()
    }

    /// Run the full pipeline on an image.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let image = self.preprocessor.limit_size(image);
        let (width, height) = image.dimensions();

        info!("Processing image: {}x{}", width, height);

        let detection = self.detector.detect(&image)?;
        if detection.boxes.is_empty() {
            debug!("No text regions detected");
        }

        let mut boxes = Vec::with_capacity(detection.boxes.len());
        for (bbox, det_score) in detection.boxes.iter().zip(&detection.scores) {
            let crop = self.preprocessor.crop_region(&image, bbox);

            let (crop, angle) = match &self.classifier {
                Some(classifier) => classifier.auto_rotate(crop)?,
                None => (crop, 0),
            };

            let recognized = self.recognizer.recognize(&crop)?;
            if recognized.confidence < self.config.recognition_threshold {
                continue;
            }

            boxes.push(TextBox {
                bbox: *bbox,
                text: recognized.text,
                detection_score: *det_score,
                recognition_score: recognized.confidence,
                angle,
            });
        }

        let result = OcrResult::new(boxes, (width, height), start.elapsed().as_millis() as u64);

        info!(
            "OCR complete: {} text boxes in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        Ok(result)
    }

    /// Recognised lines, each terminated by a newline.
    pub fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.process(image)?.page_text())
    }
}

impl OcrEngine<OrtBackend> {
    /// Load the pipeline from `model_dir` using the file names in `models`.
    ///
    /// The classifier is skipped when its model file is absent, and the
    /// built-in Latin dictionary is used when the dictionary file is absent.
    pub fn from_dir(
        model_dir: &Path,
        models: &ModelConfig,
        config: OcrConfig,
    ) -> Result<Self, OcrError> {
        let threads = config.num_threads;
        let load = |path: &Path, what: &str| {
            OrtBackend::from_file(path, threads).map_err(|e| {
                OcrError::ModelLoad(format!("{} ({}): {}", what, path.display(), e))
            })
        };

        let mut builder = OcrEngine::builder()
            .with_config(config.clone())
            .with_detector(TextDetector::new(load(&models.detection_path(model_dir), "detector")?));

        let cls_path = models.classification_path(model_dir);
        if config.enable_classification {
            if cls_path.exists() {
                builder = builder.with_classifier(AngleClassifier::new(load(&cls_path, "classifier")?));
            } else {
                warn!("Angle classifier not found at {}, skipping", cls_path.display());
            }
        }

        let dict_path = models.dictionary_path(model_dir);
        let dictionary = if dict_path.exists() {
            TextRecognizer::<OrtBackend>::load_dictionary(&dict_path)?
        } else {
            debug!("No dictionary at {}, using built-in Latin table", dict_path.display());
            TextRecognizer::<OrtBackend>::default_latin_dictionary()
        };
        builder = builder.with_recognizer(TextRecognizer::new(
            load(&models.recognition_path(model_dir), "recognizer")?,
            dictionary,
        ));

        info!("Loaded OCR pipeline from {}", model_dir.display());
        builder.build()
    }
}

impl<B: InferenceBackend> TextSource for OcrEngine<B> {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn extract(&self, input: &[u8]) -> crate::Result<String> {
        let image = decode_image(input)?;
        Ok(self.extract_text(&image)?)
    }
}
