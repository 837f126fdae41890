//! Image preprocessing for the PaddleOCR models.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;
use tracing::debug;

/// ImageNet statistics used by the detection model.
const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Recognition and classification models normalise to [-1, 1].
const REC_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
const REC_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Detection input sides must be multiples of this.
const DET_STRIDE: u32 = 32;

/// Input sizing for the detection, classification and recognition models.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    max_size: u32,
    det_target_size: u32,
    rec_height: u32,
    rec_max_width: u32,
    cls_size: (u32, u32),
}

/// Detection tensor plus what is needed to map boxes back onto the source image.
pub struct DetectionInput {
    pub tensor: Array4<f32>,
    pub scale_x: f32,
    pub scale_y: f32,
    pub original_size: (u32, u32),
}

impl ImagePreprocessor {
    pub fn new() -> Self {
        Self {
            max_size: 2048,
            det_target_size: 960,
            rec_height: 48,
            rec_max_width: 320,
            cls_size: (192, 48),
        }
    }

    /// Set the maximum dimension accepted before the pipeline starts.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size.max(DET_STRIDE);
        self
    }

    /// Shrink `image` so its longer side is at most the configured maximum.
    pub fn limit_size(&self, image: &DynamicImage) -> DynamicImage {
        let (w, h) = image.dimensions();
        let (nw, nh) = fit_within(w, h, self.max_size);
        if (nw, nh) == (w, h) {
            image.clone()
        } else {
            debug!("Downscaling input from {}x{} to {}x{}", w, h, nw, nh);
            image.resize_exact(nw, nh, FilterType::Triangle)
        }
    }

    /// NCHW tensor for the detection model, padded to a multiple of 32.
    pub fn detection_input(&self, image: &DynamicImage) -> DetectionInput {
        let (orig_w, orig_h) = image.dimensions();
        let (w, h) = fit_within(orig_w, orig_h, self.det_target_size);
        let rgb = image.resize_exact(w, h, FilterType::Lanczos3).to_rgb8();

        let padded_w = w.div_ceil(DET_STRIDE) * DET_STRIDE;
        let padded_h = h.div_ceil(DET_STRIDE) * DET_STRIDE;

        let mut tensor = Array4::<f32>::zeros((1, 3, padded_h as usize, padded_w as usize));
        normalize_into(&mut tensor, &rgb, DET_MEAN, DET_STD);

        DetectionInput {
            tensor,
            scale_x: w as f32 / orig_w as f32,
            scale_y: h as f32 / orig_h as f32,
            original_size: (orig_w, orig_h),
        }
    }

    /// NCHW tensor for the recognition model: fixed height, aspect-preserving
    /// width capped at the model width, right-padded with zeros.
    pub fn recognition_input(&self, crop: &DynamicImage) -> Array4<f32> {
        let (w, h) = crop.dimensions();
        let aspect = w as f32 / h.max(1) as f32;
        let width = ((self.rec_height as f32 * aspect) as u32).clamp(1, self.rec_max_width);

        let rgb = crop
            .resize_exact(width, self.rec_height, FilterType::Lanczos3)
            .to_rgb8();

        let mut tensor =
            Array4::<f32>::zeros((1, 3, self.rec_height as usize, self.rec_max_width as usize));
        normalize_into(&mut tensor, &rgb, REC_MEAN, REC_STD);
        tensor
    }

    /// NCHW tensor for the 0°/180° angle classifier.
    pub fn classification_input(&self, crop: &DynamicImage) -> Array4<f32> {
        let (w, h) = self.cls_size;
        let rgb = crop.resize_exact(w, h, FilterType::Lanczos3).to_rgb8();

        let mut tensor = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
        normalize_into(&mut tensor, &rgb, REC_MEAN, REC_STD);
        tensor
    }

    /// Crop the axis-aligned rectangle enclosing a quadrilateral.
    pub fn crop_region(&self, image: &DynamicImage, bbox: &[f32; 8]) -> DynamicImage {
        let xs = [bbox[0], bbox[2], bbox[4], bbox[6]];
        let ys = [bbox[1], bbox[3], bbox[5], bbox[7]];

        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min).max(0.0) as u32;
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min).max(0.0) as u32;
        let max_x = xs
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
            .min(image.width() as f32) as u32;
        let max_y = ys
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
            .min(image.height() as f32) as u32;

        let width = max_x.saturating_sub(min_x).max(1);
        let height = max_y.saturating_sub(min_y).max(1);

        image.crop_imm(min_x, min_y, width, height)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale (w, h) down so the longer side is at most `limit`, keeping aspect ratio.
fn fit_within(w: u32, h: u32, limit: u32) -> (u32, u32) {
    let longest = w.max(h);
    if longest <= limit {
        return (w, h);
    }
    let scale = limit as f32 / longest as f32;
    (
        ((w as f32 * scale) as u32).max(1),
        ((h as f32 * scale) as u32).max(1),
    )
}

/// Write `(pixel / 255 - mean) / std` into the top-left corner of `tensor`.
fn normalize_into(tensor: &mut Array4<f32>, rgb: &RgbImage, mean: [f32; 3], std: [f32; 3]) {
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (value - mean[c]) / std[c];
        }
    }
}
