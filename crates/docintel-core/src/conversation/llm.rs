//! Chat model seam and its edgequake-llm implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use tracing::{debug, info};

use crate::error::ConversationError;
use crate::models::config::ConversationConfig;

use super::transcript::Transcript;

/// Produces one reply given a system prompt and the conversation so far.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn respond(
        &self,
        system_prompt: &str,
        transcript: &Transcript,
    ) -> Result<String, ConversationError>;
}

/// [`ChatModel`] backed by an `edgequake_llm` provider.
pub struct ProviderChatModel {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
    cache_seed: Option<u64>,
}

impl ProviderChatModel {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ConversationConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.timeout_secs),
            cache_seed: config.cache_seed,
        }
    }

    /// Create the provider named in `config`; credentials come from the environment.
    pub fn from_config(config: &ConversationConfig) -> Result<Self, ConversationError> {
        let provider = ProviderFactory::create_llm_provider(&config.provider, &config.model)
            .map_err(|e| ConversationError::ProviderNotConfigured {
                provider: config.provider.clone(),
                reason: format!("{e}"),
            })?;

        info!("Using LLM provider '{}' with model '{}'", config.provider, config.model);
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl ChatModel for ProviderChatModel {
    async fn respond(
        &self,
        system_prompt: &str,
        transcript: &Transcript,
    ) -> Result<String, ConversationError> {
        let messages = build_messages(system_prompt, transcript);
        debug!(
            "Sending {} messages to LLM (cache_seed: {:?})",
            messages.len(),
            self.cache_seed
        );

        let response = tokio::time::timeout(
            self.timeout,
            self.provider.chat(&messages, Some(&self.options)),
        )
        .await
        .map_err(|_| ConversationError::Timeout(self.timeout.as_secs()))?
        .map_err(|e| ConversationError::Llm(format!("{e}")))?;

        debug!(
            "LLM reply: {} prompt tokens, {} completion tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// System prompt first, then every transcript entry as a user turn.
fn build_messages(system_prompt: &str, transcript: &Transcript) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];
    messages.extend(
        transcript
            .messages()
            .iter()
            .map(|m| ChatMessage::user(m.content.as_str())),
    );
    messages
}

fn build_options(config: &ConversationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: config.max_tokens,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Message, Role};
    use edgequake_llm::{ChatRole, LLMResponse, LlmError, MockProvider};
    use pretty_assertions::assert_eq;

    /// Provider that answers every call with a fixed outcome after a delay.
    struct ScriptedProvider {
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                Err(LlmError::ApiError("upstream returned 503".into()))
            } else {
                Ok(LLMResponse::new("late reply", "scripted-model"))
            }
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete("").await
        }
    }

    fn config_with_timeout(secs: u64) -> ConversationConfig {
        let mut config = ConversationConfig::default();
        config.timeout_secs = secs;
        config
    }

    fn opening() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(Message::new(Role::Initiator, "supervisor", "NUMERO 3920143738"));
        transcript
    }

    #[test]
    fn test_build_options_from_config() {
        let mut config = ConversationConfig::default();
        config.max_tokens = Some(512);
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(512));
    }

    #[test]
    fn test_build_messages_prepends_system_prompt() {
        let messages = build_messages("valida", &opening());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[0].content, "valida");
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[1].content, "NUMERO 3920143738");
    }

    #[tokio::test]
    async fn test_respond_returns_provider_content() {
        let provider = MockProvider::new();
        provider.add_response("{\"NUMERO\": \"3920143738\"}").await;
        let model = ProviderChatModel::new(Arc::new(provider), &config_with_timeout(5));

        let reply = model.respond("valida", &opening()).await.unwrap();
        assert_eq!(reply, "{\"NUMERO\": \"3920143738\"}");
    }

    #[tokio::test]
    async fn test_respond_times_out() {
        let provider = ScriptedProvider {
            delay: Duration::from_secs(5),
            fail: false,
        };
        let model = ProviderChatModel::new(Arc::new(provider), &config_with_timeout(1));

        let err = model.respond("valida", &opening()).await.unwrap_err();
        assert!(matches!(err, ConversationError::Timeout(1)), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_respond_maps_provider_error() {
        let provider = ScriptedProvider {
            delay: Duration::ZERO,
            fail: true,
        };
        let model = ProviderChatModel::new(Arc::new(provider), &config_with_timeout(1));

        let err = model.respond("valida", &opening()).await.unwrap_err();
        match err {
            ConversationError::Llm(msg) => assert!(msg.contains("503"), "got: {msg}"),
            other => panic!("expected Llm error, got {other:?}"),
        }
    }
}
