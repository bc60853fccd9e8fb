use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Text recognition failed: {0}")]
    RecognitionError(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Batch must contain between 1 and {max} images, got {count}")]
    BatchSize { count: usize, max: usize },

    #[error("No text could be extracted from the uploaded images")]
    NoTextExtracted,

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Access denied")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl OcrError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            OcrError::InitializationError(_) => "INIT_ERROR",
            OcrError::InvalidConfig(_) => "INVALID_CONFIG",
            OcrError::PreprocessingError(_) => "PREPROCESSING_ERROR",
            OcrError::RecognitionError(_) => "RECOGNITION_ERROR",
            OcrError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            OcrError::BatchSize { .. } => "BATCH_SIZE",
            OcrError::NoTextExtracted => "NO_TEXT_EXTRACTED",
            OcrError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            OcrError::MissingFile => "MISSING_FILE",
            OcrError::Unauthorized => "UNAUTHORIZED",
            OcrError::InvalidRequest(_) => "INVALID_REQUEST",
            OcrError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            OcrError::InitializationError(_)
            | OcrError::InvalidConfig(_)
            | OcrError::PreprocessingError(_)
            | OcrError::RecognitionError(_)
            | OcrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OcrError::UnsupportedFormat(_)
            | OcrError::BatchSize { .. }
            | OcrError::MissingFile
            | OcrError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            OcrError::NoTextExtracted => StatusCode::UNPROCESSABLE_ENTITY,
            OcrError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            OcrError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}
