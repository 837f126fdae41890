//! Error responses of the HTTP layer.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of an upload route, rendered as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The uploaded file has the wrong extension.
    #[error("{0}")]
    BadUpload(&'static str),

    /// The body is not a readable multipart form.
    #[error("Se esperaba un formulario multipart: {0}")]
    NotMultipart(String),

    /// The form has no `file` field.
    #[error("Falta el campo 'file'")]
    MissingFile,

    /// The upload body could not be read.
    #[error("Error al leer el archivo: {0}")]
    ReadFailure(String),

    /// Extraction, OCR or the conversation failed.
    #[error("{0}")]
    ProcessingFailure(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotMultipart(_) | ApiError::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ReadFailure(_) | ApiError::ProcessingFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::NotMultipart(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            error!("{} -> {}", status, detail);
        } else {
            warn!("{} -> {}", status, detail);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadUpload("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingFile.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ApiError::NotMultipart("boundary".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::ReadFailure("eof".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_read_failure_detail() {
        let err = ApiError::ReadFailure("connection reset".into());
        assert_eq!(err.to_string(), "Error al leer el archivo: connection reset");
    }
}
