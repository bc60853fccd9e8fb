//! Batch OCR aggregation
//!
//! Folds a batch of uploads through the transient store, the preprocessor and
//! the OCR engine, one image at a time and in submission order. A failure on
//! one image never affects its siblings; only an out-of-range batch size or a
//! batch that produced no text at all is reported to the caller.

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::language::LanguageSet;
use crate::preprocessing::Preprocessor;
use crate::storage::TransientStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Largest number of images accepted in one batch
pub const MAX_BATCH_SIZE: usize = 10;

/// Extensions accepted for recognition (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Separator appended after each image's text
pub const TEXT_SEPARATOR: &str = "\n\n";

/// A single uploaded image
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased substring after the last `.`, if any
    pub fn extension(&self) -> Option<String> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Allowed extension of this upload, or `UnsupportedFormat`
    fn allowed_extension(&self) -> Result<String, OcrError> {
        match self.extension() {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
            _ => Err(OcrError::UnsupportedFormat(self.filename.clone())),
        }
    }
}

/// Ordered images submitted together
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    uploads: Vec<Upload>,
}

impl UploadBatch {
    pub fn new(uploads: Vec<Upload>) -> Self {
        Self { uploads }
    }

    pub fn push(&mut self, upload: Upload) {
        self.uploads.push(upload);
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Upload> {
        self.uploads.iter()
    }
}

impl From<Vec<Upload>> for UploadBatch {
    fn from(uploads: Vec<Upload>) -> Self {
        Self::new(uploads)
    }
}

/// What happened to one image of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    Recognized { chars: usize },
    Skipped,
    PreprocessingFailed { cause: String },
    RecognitionFailed { cause: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: ImageOutcome,
}

/// Aggregate text of a batch that produced at least some text
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub text: String,
    pub images: Vec<ImageReport>,
    pub processing_time_ms: u64,
}

/// Runs batches through preprocessing and recognition
pub struct BatchProcessor {
    engine: Arc<dyn OcrEngine>,
    preprocessor: Preprocessor,
    languages: LanguageSet,
    store: TransientStore,
}

impl BatchProcessor {
    pub fn new(engine: Arc<dyn OcrEngine>, languages: LanguageSet, store: TransientStore) -> Self {
        Self {
            engine,
            preprocessor: Preprocessor::new(),
            languages,
            store,
        }
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Process every image of `batch` and join the recognized text
    pub fn process(&self, batch: &UploadBatch) -> Result<BatchResult, OcrError> {
        if batch.is_empty() || batch.len() > MAX_BATCH_SIZE {
            return Err(OcrError::BatchSize {
                count: batch.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        let start = Instant::now();
        let mut text = String::new();
        let mut images = Vec::with_capacity(batch.len());

        for (index, upload) in batch.iter().enumerate() {
            let outcome = match self.process_one(upload) {
                Ok(recognized) => {
                    let chars = recognized.chars().count();
                    text.push_str(&recognized);
                    text.push_str(TEXT_SEPARATOR);
                    ImageOutcome::Recognized { chars }
                }
                Err(OcrError::UnsupportedFormat(_)) => {
                    tracing::debug!("Skipping {} (unsupported extension)", upload.filename);
                    ImageOutcome::Skipped
                }
                Err(OcrError::PreprocessingError(cause)) => {
                    tracing::warn!(
                        "Image {} ({}) could not be preprocessed: {}",
                        index + 1,
                        upload.filename,
                        cause
                    );
                    ImageOutcome::PreprocessingFailed { cause }
                }
                Err(e) => {
                    tracing::warn!(
                        "Image {} ({}) could not be recognized: {}",
                        index + 1,
                        upload.filename,
                        e
                    );
                    // Counts as an empty recognition
                    text.push_str(TEXT_SEPARATOR);
                    ImageOutcome::RecognitionFailed {
                        cause: e.to_string(),
                    }
                }
            };

            images.push(ImageReport {
                filename: upload.filename.clone(),
                outcome,
            });
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;

        if text.trim().is_empty() {
            tracing::info!(
                "Batch of {} images produced no text in {}ms",
                batch.len(),
                processing_time_ms
            );
            return Err(OcrError::NoTextExtracted);
        }

        tracing::info!(
            "Batch of {} images completed in {}ms, text length: {}",
            batch.len(),
            processing_time_ms,
            text.len()
        );

        Ok(BatchResult {
            text,
            images,
            processing_time_ms,
        })
    }

    /// Store, preprocess and recognize a single upload.
    /// The transient copy is removed on every return path.
    fn process_one(&self, upload: &Upload) -> Result<String, OcrError> {
        let extension = upload.allowed_extension()?;
        let stored = self
            .store
            .persist(&extension, &upload.bytes)
            .map_err(|e| OcrError::PreprocessingError(e.to_string()))?;

        let normalized = self.preprocessor.enhance_file(stored.path())?;
        let timings: Vec<String> = normalized
            .steps
            .iter()
            .map(|step| format!("{}={}ms", step.name, step.time_ms))
            .collect();
        tracing::debug!(
            "Preprocessed {} in {}ms ({})",
            upload.filename,
            normalized.total_time_ms,
            timings.join(", ")
        );

        let text = self
            .engine
            .recognize(&normalized, &self.languages)
            .map_err(|e| match e {
                OcrError::RecognitionError(_) => e,
                other => OcrError::RecognitionError(other.to_string()),
            })?;

        drop(stored);
        Ok(text)
    }
}
