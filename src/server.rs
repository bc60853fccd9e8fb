use crate::batch::{
    BatchProcessor, ImageReport, Upload, UploadBatch, ALLOWED_EXTENSIONS, MAX_BATCH_SIZE,
};
use crate::config::Config;
use crate::engines;
use crate::error::OcrError;
use crate::storage::TransientStore;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and the token field on top of the files
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<BatchProcessor>,
    pub config: Arc<Config>,
}

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub text: String,
    pub images: Vec<ImageReport>,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub engine_description: String,
    pub languages: Vec<String>,
    pub installed_languages: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub max_batch_size: usize,
    pub max_file_size_bytes: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = engines::from_config(&config)?;
    let store = TransientStore::new(&config.upload_dir)?;
    let processor = BatchProcessor::new(engine, config.languages.clone(), store);
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Requesting languages {} in every OCR call", config.languages);

    let state = AppState {
        processor: Arc::new(processor),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_file_size
        .saturating_mul(MAX_BATCH_SIZE)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/upload", post(handle_upload))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle batch upload requests
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, OcrError> {
    let start = Instant::now();

    let mut authorized = false;
    let mut batch = UploadBatch::default();

    // Parse multipart form. The token field must precede the files so that
    // nothing is buffered for unauthenticated clients.
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "access_token" => {
                let token = field.text().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Invalid access token field: {}", e))
                })?;
                authorized = token == state.config.access_token;
            }
            "file" => {
                if !authorized {
                    tracing::warn!("Rejected upload with missing or invalid access token");
                    return Err(OcrError::Unauthorized);
                }
                if batch.len() == MAX_BATCH_SIZE {
                    return Err(OcrError::BatchSize {
                        count: batch.len() + 1,
                        max: MAX_BATCH_SIZE,
                    });
                }

                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?;
                if data.len() > state.config.max_file_size {
                    return Err(OcrError::ImageTooLarge {
                        size: data.len(),
                        max: state.config.max_file_size,
                    });
                }
                batch.push(Upload::new(filename, data.to_vec()));
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    if !authorized {
        tracing::warn!("Rejected upload with missing or invalid access token");
        return Err(OcrError::Unauthorized);
    }

    if batch.is_empty() {
        return Err(OcrError::MissingFile);
    }

    let processor = state.processor.clone();
    let result = tokio::task::spawn_blocking(move || processor.process(&batch))
        .await
        .map_err(|e| OcrError::Internal(format!("OCR worker failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Upload handled in {}ms, text length: {}",
        processing_time_ms,
        result.text.len()
    );

    Ok(Json(UploadResponse {
        text: result.text,
        images: result.images,
        processing_time_ms,
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> Result<Json<InfoResponse>, OcrError> {
    let processor = state.processor.clone();
    // Listing installed languages shells out to the engine
    let installed_languages =
        tokio::task::spawn_blocking(move || processor.engine().supported_languages())
            .await
            .map_err(|e| OcrError::Internal(format!("Engine query failed: {}", e)))?;

    let engine = state.processor.engine();

    Ok(Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: engine.name().to_string(),
        engine_description: engine.description().to_string(),
        languages: state.processor.languages().codes().to_vec(),
        installed_languages,
        allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        max_batch_size: MAX_BATCH_SIZE,
        max_file_size_bytes: state.config.max_file_size,
    }))
}
