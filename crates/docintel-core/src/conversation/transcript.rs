//! Ordered record of a conversation.

use serde::{Deserialize, Serialize};

use super::policy::Role;

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// Display name of the speaker.
    pub name: String,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role,
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Append-only list of messages, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Message contents in order.
    pub fn contents(&self) -> Vec<String> {
        self.messages.iter().map(|m| m.content.clone()).collect()
    }

    pub fn into_contents(self) -> Vec<String> {
        self.messages.into_iter().map(|m| m.content).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_contents_keep_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::new(Role::Initiator, "supervisor", "texto"));
        transcript.push(Message::new(Role::Validator, "validation_agent", "{\"A\": 1}"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[1].role, Role::Validator);
        assert_eq!(transcript.contents(), vec!["texto", "{\"A\": 1}"]);
        assert_eq!(transcript.into_contents(), vec!["texto", "{\"A\": 1}"]);
    }

    #[test]
    fn test_new_is_empty() {
        assert!(Transcript::new().is_empty());
    }
}
