//! Configuration models.

pub mod config;

pub use config::{ConversationConfig, DocintelConfig, ModelConfig, OcrConfig, ServerConfig};
