//! Extraction services shared by the HTTP routes and the CLI.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use docintel_core::{
    ConversationError, ConversationRunner, DocintelConfig, DocintelError, OcrEngine,
    PdfTextExtractor, ProviderChatModel, PureOcrEngine, TextSource,
};

/// Errors from running an extraction.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The collaborator needed for this request failed to load at startup.
    #[error("{0} is not available")]
    Unavailable(&'static str),

    #[error(transparent)]
    Extraction(#[from] DocintelError),

    #[error(transparent)]
    Conversation(#[from] ConversationError),

    /// The blocking worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Body of `/extract-text/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfText {
    pub texto: String,
}

/// Body of `/extract-ocr/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrText {
    pub texto_ocr: String,
}

/// Body of `/extract-ocr-easy/`: every conversation message, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub responses: Vec<String>,
}

/// Collaborators loaded once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub pdf: Arc<dyn TextSource>,
    pub ocr: Option<Arc<dyn TextSource>>,
    pub easy_ocr: Option<Arc<dyn TextSource>>,
    pub conversation: Option<Arc<ConversationRunner>>,
}

impl AppState {
    /// State with only a PDF extractor.
    pub fn new(pdf: Arc<dyn TextSource>) -> Self {
        Self {
            pdf,
            ocr: None,
            easy_ocr: None,
            conversation: None,
        }
    }

    pub fn with_ocr(mut self, ocr: Option<Arc<dyn TextSource>>) -> Self {
        self.ocr = ocr;
        self
    }

    pub fn with_easy_ocr(mut self, easy_ocr: Option<Arc<dyn TextSource>>) -> Self {
        self.easy_ocr = easy_ocr;
        self
    }

    pub fn with_conversation(mut self, conversation: Option<Arc<ConversationRunner>>) -> Self {
        self.conversation = conversation;
        self
    }

    /// Load every collaborator described by `config`.
    ///
    /// A collaborator that fails to load is logged and left out; its route
    /// answers with a processing error until the service is restarted.
    pub fn from_config(config: &DocintelConfig) -> Self {
        let state = Self::new(Arc::new(PdfTextExtractor::new()))
            .with_ocr(load_ocr(config))
            .with_easy_ocr(load_easy_ocr(config))
            .with_conversation(load_conversation(config));

        info!(
            "Collaborators ready: ocr={}, easy_ocr={}, conversation={}",
            state.ocr.is_some(),
            state.easy_ocr.is_some(),
            state.conversation.is_some()
        );
        state
    }

    /// Text of a PDF document.
    pub async fn extract_pdf(&self, bytes: Vec<u8>) -> Result<PdfText, ServiceError> {
        let texto = run_blocking(self.pdf.clone(), bytes).await?;
        Ok(PdfText { texto })
    }

    /// Page text of an image through the ONNX Runtime pipeline.
    pub async fn extract_ocr(&self, bytes: Vec<u8>) -> Result<OcrText, ServiceError> {
        let ocr = self.ocr.clone().ok_or(ServiceError::Unavailable("OCR pipeline"))?;
        let texto_ocr = run_blocking(ocr, bytes).await?;
        Ok(OcrText { texto_ocr })
    }

    /// OCR an image with the second engine, then run the validation conversation.
    pub async fn extract_and_validate(&self, bytes: Vec<u8>) -> Result<Validation, ServiceError> {
        let easy_ocr = self
            .easy_ocr
            .clone()
            .ok_or(ServiceError::Unavailable("easy OCR engine"))?;
        let conversation = self
            .conversation
            .clone()
            .ok_or(ServiceError::Unavailable("LLM provider"))?;

        let text = run_blocking(easy_ocr, bytes).await?;
        let transcript = conversation.run(&text).await?;

        Ok(Validation {
            responses: transcript.into_contents(),
        })
    }
}

/// Run a [`TextSource`] on the blocking thread pool.
async fn run_blocking(source: Arc<dyn TextSource>, bytes: Vec<u8>) -> Result<String, ServiceError> {
    let text = tokio::task::spawn_blocking(move || source.extract(&bytes)).await??;
    Ok(text)
}

/// Load the ONNX Runtime PaddleOCR pipeline, if its models are present.
pub fn load_ocr(config: &DocintelConfig) -> Option<Arc<dyn TextSource>> {
    match OcrEngine::from_dir(&config.models.pipeline_dir, &config.models, config.ocr.clone()) {
        Ok(engine) => Some(Arc::new(engine)),
        Err(e) => {
            warn!("OCR pipeline disabled: {}", e);
            None
        }
    }
}

/// Load the pure-Rust OCR engine, if its models are present.
pub fn load_easy_ocr(config: &DocintelConfig) -> Option<Arc<dyn TextSource>> {
    match PureOcrEngine::from_dir(&config.models.pure_dir, &config.models, config.ocr.clone()) {
        Ok(engine) => Some(Arc::new(engine)),
        Err(e) => {
            warn!("Easy OCR engine disabled: {}", e);
            None
        }
    }
}

/// Create the LLM provider and the conversation runner around it.
pub fn load_conversation(config: &DocintelConfig) -> Option<Arc<ConversationRunner>> {
    match ProviderChatModel::from_config(&config.conversation) {
        Ok(model) => Some(Arc::new(ConversationRunner::new(
            Arc::new(model),
            config.conversation.clone(),
        ))),
        Err(e) => {
            warn!("Conversation disabled: {}", e);
            None
        }
    }
}
