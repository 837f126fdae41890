//! Second OCR engine backed by `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};
use crate::source::TextSource;

use super::{OcrResult, TextBox, decode_image};

/// OCR engine running entirely in Rust, without ONNX Runtime.
pub struct PureOcrEngine {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Load detection, recognition and dictionary files from `model_dir`.
    pub fn from_dir(
        model_dir: &Path,
        models: &ModelConfig,
        config: OcrConfig,
    ) -> Result<Self, OcrError> {
        let det_path = models.detection_path(model_dir);
        let rec_path = models.recognition_path(model_dir);
        let dict_path = models.dictionary_path(model_dir);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
            config,
        })
    }

    /// Run OCR on an image. The image is converted to RGB first.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let image = DynamicImage::ImageRgb8(image.to_rgb8());
        let (width, height) = image.dimensions();

        info!("Processing image: {}x{}", width, height);

        let results = {
            let engine = self
                .engine
                .lock()
                .map_err(|e| OcrError::Detection(format!("engine lock poisoned: {}", e)))?;
            engine
                .run_from_image(&image)
                .map_err(|e| OcrError::Detection(format!("pure-onnx-ocr: {}", e)))?
        };

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: clean_text(&r.text, self.config.keep_unk),
                detection_score: r.confidence,
                recognition_score: r.confidence,
                angle: 0,
            })
            .collect();

        let result = OcrResult::new(boxes, (width, height), start.elapsed().as_millis() as u64);

        info!(
            "OCR complete: {} text boxes in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        Ok(result)
    }

    /// Recognised segments joined with a single newline.
    pub fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.process(image)?.joined_text())
    }
}

impl TextSource for PureOcrEngine {
    fn name(&self) -> &'static str {
        "easy-ocr"
    }

    fn extract(&self, input: &[u8]) -> crate::Result<String> {
        let image = decode_image(input)?;
        Ok(self.extract_text(&image)?)
    }
}

/// Blank out `[UNK]` tokens unless asked to keep them.
fn clean_text(text: &str, keep_unk: bool) -> String {
    if keep_unk {
        text.to_string()
    } else {
        text.replace("[UNK]", " ")
    }
}

/// First four exterior points of a polygon as `[x1, y1, ..., x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
