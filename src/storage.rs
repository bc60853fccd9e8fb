//! Transient on-disk copies of uploaded images
//!
//! Every upload is written to its own uniquely named file and removed again as
//! soon as the guard returned by [`TransientStore::persist`] is dropped.

use crate::error::OcrError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory holding the per-image copies of the batch being processed
#[derive(Debug, Clone)]
pub struct TransientStore {
    dir: PathBuf,
}

/// A persisted upload; the file is deleted when this value is dropped
#[derive(Debug)]
pub struct TransientFile {
    file: NamedTempFile,
}

impl TransientFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl TransientStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, OcrError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            OcrError::InitializationError(format!(
                "Failed to create upload directory {:?}: {}",
                dir, e
            ))
        })?;
        Ok(Self { dir })
    }

    /// Write `bytes` to a fresh file carrying `extension` as its suffix.
    /// The client's filename never becomes part of the path.
    pub fn persist(&self, extension: &str, bytes: &[u8]) -> Result<TransientFile, OcrError> {
        let suffix = format!(".{}", extension);
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| OcrError::Internal(format!("Failed to create temp file: {}", e)))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| OcrError::Internal(format!("Failed to write temp file: {}", e)))?;

        tracing::debug!("Stored {} bytes at {:?}", bytes.len(), file.path());

        Ok(TransientFile { file })
    }
}
