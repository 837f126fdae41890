//! Speaker selection.

use serde::{Deserialize, Serialize};

/// Participant in the validation conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Opens the conversation with the OCR text; never calls the model.
    Initiator,
    /// Reviews the opening message with one model call.
    Validator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Initiator => "initiator",
            Role::Validator => "validator",
        }
    }
}

/// Who speaks after `last`, or `None` once the conversation is over.
pub fn next_speaker(last: Role) -> Option<Role> {
    match last {
        Role::Initiator => Some(Role::Validator),
        Role::Validator => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiator_hands_over_to_validator() {
        assert_eq!(next_speaker(Role::Initiator), Some(Role::Validator));
    }

    #[test]
    fn test_validator_ends_conversation() {
        assert_eq!(next_speaker(Role::Validator), None);
    }

    #[test]
    fn test_walk_from_initiator_visits_each_role_once() {
        let mut order = vec![Role::Initiator];
        while let Some(next) = next_speaker(*order.last().unwrap()) {
            order.push(next);
        }
        assert_eq!(order, vec![Role::Initiator, Role::Validator]);
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Validator).unwrap(), "\"validator\"");
    }
}
