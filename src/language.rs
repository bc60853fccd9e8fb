//! Tesseract language sets
//!
//! All configured languages are requested in a single recognition call so
//! mixed-script documents work without per-image language detection.

use crate::error::OcrError;
use std::fmt;
use std::str::FromStr;

/// Languages requested when none are configured.
/// Covers Latin, Cyrillic, CJK, Indic and Arabic scripts.
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "eng",     // English
    "spa",     // Spanish
    "fra",     // French
    "deu",     // German
    "ita",     // Italian
    "por",     // Portuguese
    "nld",     // Dutch
    "rus",     // Russian
    "ukr",     // Ukrainian
    "chi_sim", // Chinese Simplified
    "chi_tra", // Chinese Traditional
    "jpn",     // Japanese
    "kor",     // Korean
    "hin",     // Hindi
    "ben",     // Bengali
    "ara",     // Arabic
];

/// Ordered, de-duplicated list of tesseract language codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    codes: Vec<String>,
}

impl LanguageSet {
    pub fn new<I, S>(codes: I) -> Result<Self, OcrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim();
            if code.is_empty() {
                continue;
            }
            if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(OcrError::InvalidConfig(format!(
                    "invalid language code '{}'",
                    code
                )));
            }
            if !unique.iter().any(|c| c == code) {
                unique.push(code.to_string());
            }
        }

        if unique.is_empty() {
            return Err(OcrError::InvalidConfig(
                "language set must not be empty".to_string(),
            ));
        }

        Ok(Self { codes: unique })
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Format expected by `tesseract -l`
    pub fn to_tesseract_arg(&self) -> String {
        self.codes.join("+")
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self {
            codes: DEFAULT_LANGUAGES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl FromStr for LanguageSet {
    type Err = OcrError;

    /// Accepts `eng+spa` as well as `eng,spa`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split(['+', ',']))
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tesseract_arg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_multiple_scripts() {
        let langs = LanguageSet::default();
        for code in ["eng", "rus", "chi_sim", "hin", "ara"] {
            assert!(langs.codes().iter().any(|c| c == code), "missing {}", code);
        }
        assert!(langs.to_tesseract_arg().starts_with("eng+spa+"));
    }

    #[test]
    fn test_parse_plus_and_comma_separated() {
        let langs: LanguageSet = "eng+deu, fra".parse().unwrap();
        assert_eq!(langs.to_tesseract_arg(), "eng+deu+fra");
    }

    #[test]
    fn test_parse_removes_duplicates() {
        let langs: LanguageSet = "eng+eng+rus".parse().unwrap();
        assert_eq!(langs.codes(), &["eng".to_string(), "rus".to_string()]);
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert!("".parse::<LanguageSet>().is_err());
        assert!(" + ".parse::<LanguageSet>().is_err());
        assert!("eng;rm -rf".parse::<LanguageSet>().is_err());
    }
}
