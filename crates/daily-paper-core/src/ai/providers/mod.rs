mod openai;

pub use openai::OpenAiProvider;

use crate::Result;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// A single message in a chat completion request
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

/// Trait for chat completion providers
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Model name sent with every request
    fn model(&self) -> &str;

    /// Issue one completion request and return the text of the first choice
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}
