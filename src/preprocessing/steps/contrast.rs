use crate::error::OcrError;
use image::{GrayImage, Luma};

/// Contrast multiplier used for OCR input
pub const CONTRAST_FACTOR: f32 = 2.0;

/// Scale every pixel's distance from the mean grey level by `factor`,
/// clipped to 0-255
pub fn apply(gray: &GrayImage, factor: f32) -> Result<GrayImage, OcrError> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(OcrError::PreprocessingError(format!(
            "invalid contrast factor: {}",
            factor
        )));
    }

    let mean = mean_level(gray);
    let enhanced = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0] as f32;
        let value = mean + factor * (pixel - mean);
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });

    Ok(enhanced)
}

/// Rounded mean grey level; 0 for an empty image
fn mean_level(gray: &GrayImage) -> f32 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    (sum as f64 / count as f64).round() as f32
}
