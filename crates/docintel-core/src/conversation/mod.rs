//! Two-role LLM conversation run over OCR output.
//!
//! The initiator opens with the OCR text, the validator answers once, and the
//! conversation ends. [`ConversationRunner`] drives the turns picked by
//! [`next_speaker`] against any [`ChatModel`].

mod llm;
mod policy;
mod runner;
mod transcript;

pub use llm::{ChatModel, ProviderChatModel};
pub use policy::{Role, next_speaker};
pub use runner::ConversationRunner;
pub use transcript::{Message, Transcript};
