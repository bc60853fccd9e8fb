//! Batch OCR server
//!
//! Accepts up to ten uploaded images, normalizes each one for recognition,
//! runs a multi-language OCR engine over it and joins the recognized text in
//! submission order.

pub mod batch;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod language;
pub mod preprocessing;
pub mod server;
pub mod storage;

pub use batch::{BatchProcessor, BatchResult, ImageOutcome, Upload, UploadBatch};
pub use config::{Args, Config};
pub use error::OcrError;
