use crate::error::OcrError;
use image::{DynamicImage, GrayImage};

/// Convert image to single-channel luma
/// Every later step operates on this buffer
pub fn apply(image: &DynamicImage) -> Result<GrayImage, OcrError> {
    Ok(image.to_luma8())
}
