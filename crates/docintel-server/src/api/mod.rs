//! Axum router with the three upload routes and a health check.

mod error;
mod upload;

pub use error::ApiError;
pub use upload::{Upload, UploadKind, read_upload};

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::service::{AppState, OcrText, PdfText, Validation};

/// Build the application router.
///
/// - `POST /extract-text/` - PDF text extraction
/// - `POST /extract-ocr/` - OCR through the ONNX Runtime pipeline
/// - `POST /extract-ocr-easy/` - OCR through the second engine, then LLM validation
/// - `GET /health`
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/extract-text/", post(extract_text))
        .route("/extract-ocr/", post(extract_ocr))
        .route("/extract-ocr-easy/", post(extract_ocr_easy))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn extract_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PdfText>, ApiError> {
    let upload = read_upload(multipart?, UploadKind::Pdf).await?;
    info!("Extracting text from '{}'", upload.file_name);

    let body = state
        .extract_pdf(upload.bytes)
        .await
        .map_err(|e| ApiError::ProcessingFailure(e.to_string()))?;
    Ok(Json(body))
}

async fn extract_ocr(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrText>, ApiError> {
    let upload = read_upload(multipart?, UploadKind::Image).await?;
    info!("Running OCR on '{}'", upload.file_name);

    let body = state
        .extract_ocr(upload.bytes)
        .await
        .map_err(|e| ApiError::ProcessingFailure(format!("Error al procesar la imagen: {e}")))?;
    Ok(Json(body))
}

async fn extract_ocr_easy(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Validation>, ApiError> {
    let upload = read_upload(multipart?, UploadKind::Image).await?;
    info!("Running OCR and validation on '{}'", upload.file_name);

    let body = state.extract_and_validate(upload.bytes).await.map_err(|e| {
        ApiError::ProcessingFailure(format!("Error al procesar la imagen con EasyOCR: {e}"))
    })?;
    Ok(Json(body))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "engines": {
            "pdf": state.pdf.name(),
            "ocr": state.ocr.as_ref().map(|s| s.name()),
            "easy_ocr": state.easy_ocr.as_ref().map(|s| s.name()),
            "conversation": state.conversation.is_some(),
        }
    }))
}
