use crate::error::OcrError;
use crate::language::LanguageSet;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "batch-ocr-server")]
#[command(about = "Batch OCR server: preprocess uploaded images and aggregate their text")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "9292")]
    pub port: u16,

    /// Shared secret that uploads must present in the `access_token` field
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Path to the tesseract binary
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    pub tesseract_path: PathBuf,

    /// Languages requested in every OCR call (e.g., "eng+spa+rus")
    #[arg(long, env = "OCR_LANGUAGES")]
    pub languages: Option<String>,

    /// Directory for transient upload copies (default: system temp dir)
    #[arg(long, env = "OCR_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Maximum size of a single uploaded file in bytes (default: 10MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "10485760")]
    pub max_file_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub access_token: String,
    pub tesseract_path: PathBuf,
    pub languages: LanguageSet,
    pub upload_dir: PathBuf,
    pub max_file_size: usize,
}

impl Config {
    pub fn default_upload_dir() -> PathBuf {
        std::env::temp_dir().join("batch-ocr-uploads")
    }
}

impl TryFrom<Args> for Config {
    type Error = OcrError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.access_token.trim().is_empty() {
            return Err(OcrError::InvalidConfig(
                "access token must not be empty".to_string(),
            ));
        }

        let languages = match args.languages.as_deref() {
            Some(list) => list.parse()?,
            None => LanguageSet::default(),
        };

        Ok(Self {
            host: args.host,
            port: args.port,
            access_token: args.access_token,
            tesseract_path: args.tesseract_path,
            languages,
            upload_dir: args.upload_dir.unwrap_or_else(Self::default_upload_dir),
            max_file_size: args.max_file_size,
        })
    }
}
