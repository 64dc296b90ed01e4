//! Common types for LLM interactions

use serde::{Deserialize, Serialize};

/// Chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// LLM response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some("stop".to_string()),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
