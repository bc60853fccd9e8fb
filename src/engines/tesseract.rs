//! Tesseract engine implementation
//!
//! Drives the system `tesseract` binary. The normalized image is written to a
//! temporary PNG and the recognized text is read back from stdout.

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::language::LanguageSet;
use crate::preprocessing::NormalizedImage;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Tesseract OCR Engine backed by the command-line binary
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    /// Create an engine for `binary`, checking that it can be executed
    pub fn new(binary: &Path) -> Result<Self, OcrError> {
        let output = Command::new(binary).arg("--version").output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OcrError::InitializationError(format!(
                    "tesseract not found at {:?} (install tesseract-ocr or set TESSERACT_PATH)",
                    binary
                ))
            } else {
                OcrError::InitializationError(format!("Failed to run {:?}: {}", binary, e))
            }
        })?;

        if !output.status.success() {
            return Err(OcrError::InitializationError(format!(
                "{:?} --version exited with {}",
                binary, output.status
            )));
        }

        // Older releases print the version banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        let version = String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        tracing::info!("Tesseract engine initialized ({})", version);

        Ok(Self {
            binary: binary.to_path_buf(),
        })
    }

    fn run_tesseract(
        &self,
        image_path: &Path,
        languages: &LanguageSet,
    ) -> Result<String, OcrError> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &languages.to_tesseract_arg()])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(clean_output(&String::from_utf8_lossy(&output.stdout)))
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::RecognitionError(format!(
                    "tesseract failed ({}): {}",
                    output.status,
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::RecognitionError(format!("tesseract not found at {:?}", self.binary)),
            ),
            Err(e) => Err(OcrError::RecognitionError(format!(
                "Failed to run tesseract: {}",
                e
            ))),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR via the system binary, all configured languages per call"
    }

    fn recognize(
        &self,
        image: &NormalizedImage,
        languages: &LanguageSet,
    ) -> Result<String, OcrError> {
        let temp_file = tempfile::Builder::new()
            .prefix("ocr-input-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::RecognitionError(format!("Failed to create temp file: {}", e)))?;

        image
            .image()
            .save_with_format(temp_file.path(), image::ImageFormat::Png)
            .map_err(|e| {
                OcrError::RecognitionError(format!("Failed to write engine input: {}", e))
            })?;

        let (width, height) = image.dimensions();
        tracing::debug!(
            "Running tesseract on {}x{} image with languages {}",
            width,
            height,
            languages
        );

        self.run_tesseract(temp_file.path(), languages)
    }

    fn supported_languages(&self) -> Vec<String> {
        let output = match Command::new(&self.binary).arg("--list-langs").output() {
            Ok(output) if output.status.success() => output.stdout,
            _ => return Vec::new(),
        };

        // First line is a header: List of available languages in "...":
        String::from_utf8_lossy(&output)
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Strip the trailing form feed and whitespace tesseract appends to each page
fn clean_output(raw: &str) -> String {
    raw.trim_end_matches(|c: char| c.is_whitespace() || c == '\u{c}')
        .to_string()
}
