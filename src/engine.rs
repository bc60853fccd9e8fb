use crate::error::OcrError;
use crate::language::LanguageSet;
use crate::preprocessing::NormalizedImage;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text in a normalized image, requesting every language
    /// in `languages` at once. An image without text yields an empty string.
    fn recognize(&self, image: &NormalizedImage, languages: &LanguageSet)
        -> Result<String, OcrError>;

    /// Get the languages this engine can be asked for, if it can tell
    fn supported_languages(&self) -> Vec<String>;
}
