//! Chat request types

use serde::{Deserialize, Serialize};

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user
    User,
    /// Assistant / model
    Model,
}

impl Role {
    /// Wire name used by the completion service
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One prior turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who spoke
    pub role: Role,
    /// What was said
    pub text: String,
}

/// Incoming chat request body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The new user message
    pub message: String,
    /// Prior conversation turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}
