//! API request and response types

use crate::llm::{ContentBlock, LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One entry of the client-held conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl ChatMessage {
    /// All text parts concatenated, or `None` when there are no parts
    pub fn text(&self) -> Option<String> {
        if self.parts.is_empty() {
            None
        } else {
            Some(self.parts.iter().map(|p| p.text.as_str()).collect())
        }
    }
}

impl From<ChatMessage> for LlmMessage {
    fn from(msg: ChatMessage) -> Self {
        let role = match msg.role {
            Role::User => MessageRole::User,
            Role::Model => MessageRole::Assistant,
        };
        LlmMessage {
            role,
            content: msg
                .parts
                .into_iter()
                .map(|p| ContentBlock::text(p.text))
                .collect(),
        }
    }
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History is required.")]
    Missing,
    #[error("The latest history entry has no text.")]
    NoText,
}

/// The newest message split from the history that precedes it
#[derive(Debug, PartialEq)]
pub struct ChatTurn {
    pub prior: Vec<LlmMessage>,
    pub user_text: String,
}

impl ChatRequest {
    /// The caller is expected to have appended the new user message already.
    pub fn into_turn(self) -> Result<ChatTurn, HistoryError> {
        let mut history = self.history.unwrap_or_default();
        let latest = history.pop().ok_or(HistoryError::Missing)?;
        let user_text = latest.text().ok_or(HistoryError::NoText)?;

        Ok(ChatTurn {
            prior: history.into_iter().map(LlmMessage::from).collect(),
            user_text,
        })
    }
}

/// Response for a completed chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
