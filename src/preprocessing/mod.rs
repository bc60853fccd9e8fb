//! Image preprocessing for OCR enhancement
//!
//! Runs the fixed grayscale, contrast, sharpen sequence that makes text
//! recognition more reliable on phone photos and scans.

pub mod pipeline;
pub mod steps;

pub use pipeline::{NormalizedImage, Preprocessor, StepTiming};
