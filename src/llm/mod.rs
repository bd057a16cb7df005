pub mod ollama;
pub mod prompt_builder;
mod prompts;
pub mod response;

use crate::error::ModelError;

/// Who a chat message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
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

/// Trait for talking to an LLM backend.
///
/// One request, one response: implementations do not retry or stream.
pub trait LlmClient {
    fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ModelError>;
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...\n[truncated {} chars]", &s[..cut], s.len() - cut)
}
