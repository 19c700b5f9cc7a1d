use serde::{Deserialize, Serialize};

use crate::persona::Persona;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The system instruction followed by the user's question, sent as one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub persona: Persona,
    messages: [ChatMessage; 2],
}

impl Exchange {
    pub fn new(persona: Persona, question: &str) -> Self {
        Self {
            persona,
            messages: [
                ChatMessage::system(persona.system_prompt()),
                ChatMessage::user(question),
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn question(&self) -> &str {
        &self.messages[1].content
    }
}
