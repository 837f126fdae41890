//! OCR engines: a PaddleOCR pipeline over ONNX Runtime and a pure-Rust engine.
//!
//! Both engines produce an [`OcrResult`]; they differ in how they render it as
//! text. [`OcrEngine`] emits newline-terminated lines like a page dump, while
//! [`PureOcrEngine`] joins segments with a single newline.

mod classifier;
mod detector;
mod engine;
mod preprocessing;
mod pure_engine;
mod recognizer;
#[cfg(test)]
mod testing;

pub use classifier::AngleClassifier;
pub use detector::{DetectionResult, TextDetector};
pub use engine::{OcrEngine, OcrEngineBuilder};
pub use preprocessing::ImagePreprocessor;
pub use pure_engine::PureOcrEngine;
pub use recognizer::{RecognitionResult, TextRecognizer, ctc_greedy_decode};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Height of the bands used to group boxes into rows when ordering them.
const ROW_BAND_PX: f32 = 20.0;

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4), clockwise from top-left.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Detection confidence score (0.0 - 1.0).
    pub detection_score: f32,

    /// Recognition confidence score (0.0 - 1.0).
    pub recognition_score: f32,

    /// Detected angle (0 or 180).
    pub angle: i32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle as (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result, putting the boxes into reading order.
    pub fn new(mut boxes: Vec<TextBox>, image_size: (u32, u32), processing_time_ms: u64) -> Self {
        sort_by_reading_order(&mut boxes);
        Self {
            boxes,
            processing_time_ms,
            image_size,
        }
    }

    /// Non-empty box texts, in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.boxes
            .iter()
            .map(|b| b.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// Lines joined with `\n`, no trailing newline.
    pub fn joined_text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    /// Every line terminated by `\n`; empty when nothing was recognised.
    pub fn page_text(&self) -> String {
        self.lines().fold(String::new(), |mut out, line| {
            out.push_str(line);
            out.push('\n');
            out
        })
    }
}

/// Sort boxes top-to-bottom by row band, then left-to-right.
pub fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = (ay / ROW_BAND_PX) as i32;
        let row_b = (by / ROW_BAND_PX) as i32;

        row_a
            .cmp(&row_b)
            .then_with(|| ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal))
    });
}

/// Decode uploaded image bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, OcrError> {
    image::load_from_memory(bytes).map_err(|e| OcrError::InvalidImage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            detection_score: 0.9,
            recognition_score: 0.9,
            angle: 0,
        }
    }

    #[test]
    fn test_reading_order() {
        let result = OcrResult::new(
            vec![
                text_box(200.0, 45.0, "second-right"),
                text_box(10.0, 48.0, "second-left"),
                text_box(300.0, 2.0, "first"),
            ],
            (400, 100),
            0,
        );
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines, vec!["first", "second-left", "second-right"]);
    }

    #[test]
    fn test_page_text_terminates_lines() {
        let result = OcrResult::new(vec![text_box(0.0, 0.0, "HELLO")], (100, 20), 0);
        assert_eq!(result.page_text(), "HELLO\n");
        assert_eq!(result.joined_text(), "HELLO");
    }

    #[test]
    fn test_blank_boxes_are_skipped() {
        let result = OcrResult::new(
            vec![text_box(0.0, 0.0, "A"), text_box(0.0, 30.0, "  "), text_box(0.0, 60.0, "B")],
            (100, 100),
            0,
        );
        assert_eq!(result.joined_text(), "A\nB");
        assert_eq!(result.page_text(), "A\nB\n");
    }

    #[test]
    fn test_empty_result_renders_empty() {
        let result = OcrResult::new(Vec::new(), (10, 10), 0);
        assert_eq!(result.page_text(), "");
        assert_eq!(result.joined_text(), "");
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        let err = decode_image(b"not an image").unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }
}
