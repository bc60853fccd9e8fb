use crate::error::OcrError;
use image::GrayImage;
use imageproc::filter::filter3x3;

/// Laplacian-based sharpening kernel
/// Center weight 5, neighbors -1 each = edge enhancement
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Single sharpening pass to make glyph edges more distinct
pub fn apply(gray: &GrayImage) -> Result<GrayImage, OcrError> {
    Ok(filter3x3(gray, &SHARPEN_KERNEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_sharpen_enhances_edges() {
        // Left half dark, right half light
        let img = GrayImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Luma([50])
            } else {
                Luma([200])
            }
        });

        let result = apply(&img).unwrap();

        let edge_left = result.get_pixel(9, 5).0[0];
        let edge_right = result.get_pixel(10, 5).0[0];

        let original_diff = 200i32 - 50;
        let result_diff = (edge_right as i32 - edge_left as i32).abs();

        assert!(
            result_diff >= original_diff,
            "Edge should be enhanced: {} >= {}",
            result_diff,
            original_diff
        );
    }

    #[test]
    fn test_sharpen_keeps_flat_regions() {
        let img = GrayImage::from_pixel(8, 8, Luma([90]));
        let result = apply(&img).unwrap();
        assert_eq!(result.get_pixel(4, 4).0[0], 90);
        assert_eq!(result.dimensions(), (8, 8));
    }
}
