//! OCR engine implementations

pub mod tesseract;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use std::sync::Arc;

/// Build the engine described by the configuration
pub fn from_config(config: &Config) -> Result<Arc<dyn OcrEngine>, OcrError> {
    tracing::info!("Initializing tesseract engine...");
    let engine = tesseract::TesseractEngine::new(&config.tesseract_path)?;
    Ok(Arc::new(engine))
}
