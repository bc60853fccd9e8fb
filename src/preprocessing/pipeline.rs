use crate::error::OcrError;
use image::{DynamicImage, GrayImage, ImageReader};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use super::steps;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Grayscale, contrast-enhanced, sharpened image ready for recognition
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    image: GrayImage,
    pub total_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

impl NormalizedImage {
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Preprocessing pipeline with a fixed step order
#[derive(Debug, Clone)]
pub struct Preprocessor {
    contrast_factor: f32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            contrast_factor: steps::contrast::CONTRAST_FACTOR,
        }
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an image file and enhance it.
    /// The format is detected from the file contents, not its extension.
    pub fn enhance_file(&self, path: &Path) -> Result<NormalizedImage, OcrError> {
        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| OcrError::PreprocessingError(format!("Failed to read image: {}", e)))?
            .decode()
            .map_err(|e| {
                OcrError::PreprocessingError(format!("Failed to decode image: {}", e))
            })?;
        self.enhance(&image)
    }

    /// Produce a normalized copy of `image`; the input is left untouched
    pub fn enhance(&self, image: &DynamicImage) -> Result<NormalizedImage, OcrError> {
        let start = Instant::now();
        let mut timings = Vec::with_capacity(3);

        let gray = run_step("grayscale", &mut timings, || steps::grayscale::apply(image))?;
        let gray = run_step("contrast", &mut timings, || {
            steps::contrast::apply(&gray, self.contrast_factor)
        })?;
        let gray = run_step("sharpen", &mut timings, || steps::sharpen::apply(&gray))?;

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Preprocessed {}x{} image in {}ms",
            gray.width(),
            gray.height(),
            total_time_ms
        );

        Ok(NormalizedImage {
            image: gray,
            total_time_ms,
            steps: timings,
        })
    }
}

fn run_step<F>(name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> Result<GrayImage, OcrError>
where
    F: FnOnce() -> Result<GrayImage, OcrError>,
{
    let step_start = Instant::now();
    let result = step_fn()?;
    timings.push(StepTiming {
        name: name.to_string(),
        time_ms: step_start.elapsed().as_millis() as u64,
    });
    Ok(result)
}
