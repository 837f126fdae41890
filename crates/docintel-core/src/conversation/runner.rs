//! Drives the conversation turn by turn.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ConversationError;
use crate::models::config::ConversationConfig;
use crate::prompts::{VALIDATION_PROMPT, opening_message};

use super::llm::ChatModel;
use super::policy::{Role, next_speaker};
use super::transcript::{Message, Transcript};

/// Runs the initiator/validator exchange for one piece of OCR text.
pub struct ConversationRunner {
    model: Arc<dyn ChatModel>,
    config: ConversationConfig,
}

impl ConversationRunner {
    pub fn new(model: Arc<dyn ChatModel>, config: ConversationConfig) -> Self {
        Self { model, config }
    }

    fn name_of(&self, role: Role) -> &str {
        match role {
            Role::Initiator => &self.config.initiator_name,
            Role::Validator => &self.config.validator_name,
        }
    }

    fn validator_prompt(&self) -> &str {
        self.config
            .validator_prompt
            .as_deref()
            .unwrap_or(VALIDATION_PROMPT)
    }

    /// Run the conversation over `text` and return the full transcript.
    ///
    /// Stops when the policy yields no speaker or the transcript reaches
    /// `max_round` entries, whichever comes first.
    pub async fn run(&self, text: &str) -> Result<Transcript, ConversationError> {
        let mut transcript = Transcript::new();
        transcript.push(Message::new(
            Role::Initiator,
            self.name_of(Role::Initiator),
            opening_message(text, self.config.frame_with_task),
        ));

        let mut last = Role::Initiator;
        while transcript.len() < self.config.max_round {
            let Some(speaker) = next_speaker(last) else {
                break;
            };

            let content = match speaker {
                Role::Validator => {
                    debug!("Turn {}: {}", transcript.len() + 1, self.name_of(speaker));
                    self.model
                        .respond(self.validator_prompt(), &transcript)
                        .await?
                }
                Role::Initiator => return Err(ConversationError::SilentRole(speaker.as_str())),
            };

            transcript.push(Message::new(speaker, self.name_of(speaker), content));
            last = speaker;
        }

        info!("Conversation finished with {} messages", transcript.len());
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Replies with a fixed string and records what it was asked.
    #[derive(Default)]
    struct EchoModel {
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn respond(
            &self,
            system_prompt: &str,
            transcript: &Transcript,
        ) -> Result<String, ConversationError> {
            self.calls
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), transcript.len()));
            Ok("{\"CIUDAD\": \"VALPARAISO\"}".to_string())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn respond(&self, _: &str, _: &Transcript) -> Result<String, ConversationError> {
            Err(ConversationError::Timeout(120))
        }
    }

    #[tokio::test]
    async fn test_default_run_has_two_messages() {
        let model = Arc::new(EchoModel::default());
        let runner = ConversationRunner::new(model.clone(), ConversationConfig::default());

        let transcript = runner.run("VALPARAISO").await.unwrap();

        assert_eq!(
            transcript.contents(),
            vec!["VALPARAISO", "{\"CIUDAD\": \"VALPARAISO\"}"]
        );
        let names: Vec<&str> = transcript.messages().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["supervisor", "validation_agent"]);

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, VALIDATION_PROMPT);
        assert_eq!(calls[0].1, 1);
    }

    #[tokio::test]
    async fn test_round_cap_of_one_skips_validator() {
        let model = Arc::new(EchoModel::default());
        let mut config = ConversationConfig::default();
        config.max_round = 1;
        let runner = ConversationRunner::new(model.clone(), config);

        let transcript = runner.run("texto").await.unwrap();

        assert_eq!(transcript.contents(), vec!["texto"]);
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_large_round_cap_still_stops_after_validator() {
        let model = Arc::new(EchoModel::default());
        let mut config = ConversationConfig::default();
        config.max_round = 10;
        let runner = ConversationRunner::new(model, config);

        assert_eq!(runner.run("texto").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_text_still_runs() {
        let runner = ConversationRunner::new(Arc::new(EchoModel::default()), ConversationConfig::default());
        let transcript = runner.run("").await.unwrap();
        assert_eq!(transcript.contents()[0], "");
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_custom_validator_prompt() {
        let model = Arc::new(EchoModel::default());
        let mut config = ConversationConfig::default();
        config.validator_prompt = Some("Revisa el JSON".to_string());
        let runner = ConversationRunner::new(model.clone(), config);

        runner.run("x").await.unwrap();
        assert_eq!(model.calls.lock().unwrap()[0].0, "Revisa el JSON");
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let runner = ConversationRunner::new(Arc::new(FailingModel), ConversationConfig::default());
        let err = runner.run("x").await.unwrap_err();
        assert!(matches!(err, ConversationError::Timeout(120)));
    }
}
