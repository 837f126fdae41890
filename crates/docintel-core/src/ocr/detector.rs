//! Text detection with the PaddleOCR DB model.

use image::DynamicImage;
use ndarray::{ArrayD, ArrayView2, Ix2, s};
use tracing::debug;

use crate::error::OcrError;
use docintel_inference::{InferenceBackend, InputTensor};

use super::preprocessing::ImagePreprocessor;

/// Connected regions smaller than this many pixels are noise.
const MIN_REGION_PIXELS: usize = 10;

/// Text detector over a DB (differentiable binarization) probability map.
pub struct TextDetector<B: InferenceBackend> {
    backend: B,
    preprocessor: ImagePreprocessor,
    threshold: f32,
    box_threshold: f32,
    unclip_ratio: f32,
}

/// Detected regions in source-image coordinates.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Quadrilaterals (TL, TR, BR, BL).
    pub boxes: Vec<[f32; 8]>,
    /// Mean map probability inside each region.
    pub scores: Vec<f32>,
    pub image_size: (u32, u32),
}

impl<B: InferenceBackend> TextDetector<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            preprocessor: ImagePreprocessor::new(),
            threshold: 0.3,
            box_threshold: 0.6,
            unclip_ratio: 1.5,
        }
    }

    /// Pixel threshold used to binarise the probability map.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Minimum mean probability for a region to be kept.
    pub fn with_box_threshold(mut self, threshold: f32) -> Self {
        self.box_threshold = threshold;
        self
    }

    pub fn with_unclip_ratio(mut self, ratio: f32) -> Self {
        self.unclip_ratio = ratio.max(1.0);
        self
    }

    /// Detect text regions in an image.
    pub fn detect(&self, image: &DynamicImage) -> Result<DetectionResult, OcrError> {
        let input = self.preprocessor.detection_input(image);
        debug!(
            "Detection input shape: {:?}, scales: ({}, {})",
            input.tensor.shape(),
            input.scale_x,
            input.scale_y
        );

        let output = self
            .backend
            .run_single_f32(InputTensor::Float32(input.tensor.into_dyn()))
            .map_err(|e| OcrError::Detection(e.to_string()))?;

        let map = probability_map(&output)?;
        let (w, h) = input.original_size;

        let mut boxes = Vec::new();
        let mut scores = Vec::new();
        for region in connected_regions(map, self.threshold) {
            let score = region.mean_score();
            if score < self.box_threshold {
                continue;
            }
            let quad = region.to_quad(self.unclip_ratio);
            boxes.push(rescale_and_clip(&quad, input.scale_x, input.scale_y, w, h));
            scores.push(score);
        }

        debug!("Detected {} text regions", boxes.len());

        Ok(DetectionResult {
            boxes,
            scores,
            image_size: input.original_size,
        })
    }
}

/// View the `[1, 1, H, W]` model output as an `H x W` map.
fn probability_map(output: &ArrayD<f32>) -> Result<ArrayView2<'_, f32>, OcrError> {
    if output.ndim() != 4 {
        return Err(OcrError::Detection(format!(
            "expected a 4-d probability map, got shape {:?}",
            output.shape()
        )));
    }
    output
        .slice(s![0, 0, .., ..])
        .into_dimensionality::<Ix2>()
        .map_err(|e| OcrError::Detection(e.to_string()))
}

/// A 4-connected group of pixels above threshold.
#[derive(Debug, Clone, PartialEq)]
struct Region {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    pixels: usize,
    score_sum: f32,
}

impl Region {
    fn mean_score(&self) -> f32 {
        self.score_sum / self.pixels as f32
    }

    /// Bounding quadrilateral expanded by `unclip_ratio` around its centre.
    fn to_quad(&self, unclip_ratio: f32) -> [f32; 8] {
        let w = (self.max_x - self.min_x) as f32;
        let h = (self.max_y - self.min_y) as f32;
        let dx = w * (unclip_ratio - 1.0) / 2.0;
        let dy = h * (unclip_ratio - 1.0) / 2.0;

        let x1 = (self.min_x as f32 - dx).max(0.0);
        let y1 = (self.min_y as f32 - dy).max(0.0);
        let x2 = self.max_x as f32 + dx;
        let y2 = self.max_y as f32 + dy;

        [x1, y1, x2, y1, x2, y2, x1, y2]
    }
}

/// Flood-fill the binarised map, keeping regions of at least [`MIN_REGION_PIXELS`].
fn connected_regions(map: ArrayView2<'_, f32>, threshold: f32) -> Vec<Region> {
    let (height, width) = map.dim();
    let mut visited = vec![false; width * height];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || map[[y, x]] <= threshold {
                continue;
            }

            let mut region = Region {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                pixels: 0,
                score_sum: 0.0,
            };
            stack.push((x, y));
            visited[y * width + x] = true;

            while let Some((cx, cy)) = stack.pop() {
                region.min_x = region.min_x.min(cx);
                region.max_x = region.max_x.max(cx);
                region.min_y = region.min_y.min(cy);
                region.max_y = region.max_y.max(cy);
                region.pixels += 1;
                region.score_sum += map[[cy, cx]];

                let neighbours = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbours {
                    if nx < width && ny < height {
                        let idx = ny * width + nx;
                        if !visited[idx] && map[[ny, nx]] > threshold {
                            visited[idx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            if region.pixels >= MIN_REGION_PIXELS {
                regions.push(region);
            }
        }
    }

    regions
}

/// Map a quad from detection-input coordinates back to the source image.
fn rescale_and_clip(quad: &[f32; 8], scale_x: f32, scale_y: f32, width: u32, height: u32) -> [f32; 8] {
    let mut out = [0.0f32; 8];
    for (i, v) in quad.iter().enumerate() {
        out[i] = if i % 2 == 0 {
            (v / scale_x).clamp(0.0, width as f32)
        } else {
            (v / scale_y).clamp(0.0, height as f32)
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::testing::StaticBackend;
    use image::RgbImage;
    use ndarray::{Array2, Array4};

    fn map_with_blobs(blobs: &[(usize, usize, usize, usize, f32)]) -> Array2<f32> {
        let mut map = Array2::<f32>::zeros((32, 64));
        for &(x, y, w, h, p) in blobs {
            map.slice_mut(s![y..y + h, x..x + w]).fill(p);
        }
        map
    }

    #[test]
    fn test_small_regions_are_ignored() {
        let map = map_with_blobs(&[(2, 2, 2, 2, 0.9), (10, 10, 10, 4, 0.9)]);
        let regions = connected_regions(map.view(), 0.3);
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].min_x, regions[0].max_x), (10, 19));
        assert_eq!(regions[0].pixels, 40);
    }

    #[test]
    fn test_disjoint_regions() {
        let map = map_with_blobs(&[(0, 0, 10, 3, 0.8), (30, 20, 10, 3, 0.8)]);
        let regions = connected_regions(map.view(), 0.3);
        assert_eq!(regions.len(), 2);
        assert!((regions[0].mean_score() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_unclip_expands_box() {
        let region = Region {
            min_x: 10,
            min_y: 10,
            max_x: 30,
            max_y: 20,
            pixels: 200,
            score_sum: 180.0,
        };
        let quad = region.to_quad(1.5);
        assert_eq!(quad, [5.0, 7.5, 35.0, 7.5, 35.0, 22.5, 5.0, 22.5]);
    }

    #[test]
    fn test_rescale_and_clip() {
        let quad = [5.0, 5.0, 300.0, 5.0, 300.0, 10.0, 5.0, 10.0];
        let out = rescale_and_clip(&quad, 0.5, 0.5, 200, 100);
        assert_eq!(out, [10.0, 10.0, 200.0, 10.0, 200.0, 20.0, 10.0, 20.0]);
    }

    #[test]
    fn test_detect_filters_low_score_regions() {
        let map = map_with_blobs(&[(4, 4, 12, 4, 0.9), (30, 20, 12, 4, 0.4)]);
        let output = Array4::from_shape_vec((1, 1, 32, 64), map.into_raw_vec_and_offset().0)
            .unwrap()
            .into_dyn();
        let detector = TextDetector::new(StaticBackend::new(vec![output]));

        let image = DynamicImage::ImageRgb8(RgbImage::new(64, 32));
        let result = detector.detect(&image).unwrap();

        assert_eq!(result.boxes.len(), 1);
        assert_eq!(result.image_size, (64, 32));
        assert!(result.scores[0] > 0.85);
    }

    #[test]
    fn test_detect_rejects_bad_shape() {
        let output = ndarray::ArrayD::<f32>::zeros(ndarray::IxDyn(&[1, 10]));
        let detector = TextDetector::new(StaticBackend::new(vec![output]));
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        assert!(matches!(detector.detect(&image), Err(OcrError::Detection(_))));
    }
}
