//! Configuration structures for the docintel service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocintelError, Result};

/// Main configuration for the docintel service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocintelConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Model file locations.
    pub models: ModelConfig,

    /// LLM post-processing configuration.
    pub conversation: ConversationConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Maximum accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run the angle classifier on each detected region (when the model exists).
    pub enable_classification: bool,

    /// Probability above which a pixel of the detection map counts as text.
    pub detection_threshold: f32,

    /// Minimum mean probability of a detected region.
    pub box_threshold: f32,

    /// Expansion factor applied to detected regions.
    pub unclip_ratio: f32,

    /// Recognition confidence threshold (0.0 - 1.0). Lines scoring below it are
    /// dropped; the default of zero keeps every line.
    pub recognition_threshold: f32,

    /// Minimum classifier confidence before a region is rotated by 180°.
    pub classification_threshold: f32,

    /// Maximum image dimension (longer side) for processing.
    pub max_image_size: u32,

    /// Intra-op threads per ONNX session.
    pub num_threads: usize,

    /// Keep `[UNK]` tokens emitted by the pure-Rust engine instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enable_classification: true,
            detection_threshold: 0.3,
            box_threshold: 0.6,
            unclip_ratio: 1.5,
            recognition_threshold: 0.0,
            classification_threshold: 0.9,
            max_image_size: 2048,
            num_threads: 4,
            keep_unk: false,
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory with the PaddleOCR models driven through ONNX Runtime.
    pub pipeline_dir: PathBuf,

    /// Directory with the models for the pure-Rust engine.
    pub pure_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Angle classification model file name (optional).
    pub classification_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pipeline_dir: PathBuf::from("models/pipeline"),
            pure_dir: PathBuf::from("models/pure"),
            detection_model: "det.onnx".to_string(),
            classification_model: "cls.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn detection_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.detection_model)
    }

    pub fn classification_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.classification_model)
    }

    pub fn recognition_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.recognition_model)
    }

    pub fn dictionary_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.dictionary)
    }
}

/// Settings for the supervisor/validator conversation.
///
/// Credentials are not stored here: the provider factory reads its usual
/// environment variables (`OPENAI_API_KEY`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Provider name understood by `edgequake_llm::ProviderFactory`.
    pub provider: String,

    /// Model identifier.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Cache seed forwarded with every request for traceability.
    pub cache_seed: Option<u64>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of transcript entries, including the opening message.
    pub max_round: usize,

    /// Maximum tokens the validator may generate.
    pub max_tokens: Option<usize>,

    /// Display name of the initiating role.
    pub initiator_name: String,

    /// Display name of the validating role.
    pub validator_name: String,

    /// Replacement for the built-in validator system prompt.
    pub validator_prompt: Option<String>,

    /// Prefix the opening message with the structuring task prompt.
    pub frame_with_task: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            cache_seed: Some(42),
            timeout_secs: 120,
            max_round: 3,
            max_tokens: None,
            initiator_name: "supervisor".to_string(),
            validator_name: "validation_agent".to_string(),
            validator_prompt: None,
            frame_with_task: false,
        }
    }
}

impl DocintelConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DocintelError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocintelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        let conv = &self.conversation;
        if conv.max_round == 0 {
            return Err(DocintelError::Config("conversation.max_round must be >= 1".into()));
        }
        if !(0.0..=2.0).contains(&conv.temperature) {
            return Err(DocintelError::Config(format!(
                "conversation.temperature must be within 0-2, got {}",
                conv.temperature
            )));
        }
        if conv.timeout_secs == 0 {
            return Err(DocintelError::Config("conversation.timeout_secs must be > 0".into()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(DocintelError::Config("server.max_upload_bytes must be > 0".into()));
        }
        Ok(())
    }
}
