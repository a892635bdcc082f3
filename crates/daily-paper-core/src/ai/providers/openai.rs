use std::time::Duration;

use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
};
use reqwest::Client;
use serde::Deserialize;

use super::{AiProvider, ChatMessage, Role};
use crate::config::LlmConfig;
use crate::{Error, Result};

const AI_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Longest slice of a non-JSON error body kept in the error message
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<serde_json::Value>,
}

/// OpenAI-compatible chat completion provider.
///
/// Requests are sent once; non-2xx responses surface as [`Error::Api`] with
/// the HTTP status preserved.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(AI_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model_name.clone(),
        })
    }
}

fn map_openai_error(err: OpenAIError) -> Error {
    Error::AiProvider(err.to_string())
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.as_str();
    let built: std::result::Result<ChatCompletionRequestMessage, OpenAIError> = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map(Into::into),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map(Into::into),
    };
    built.map_err(map_openai_error)
}

/// Build an [`Error::Api`] from a non-2xx response body
fn api_error(status: u16, body: &str) -> Error {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = match envelope.error.code {
                Some(serde_json::Value::String(s)) => Some(s),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            };
            Error::Api {
                status,
                code: code.or(envelope.error.kind),
                message: envelope.error.message.unwrap_or_default(),
            }
        }
        Err(_) => {
            let message: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            Error::Api {
                status,
                code: None,
                message,
            }
        }
    }
}

#[async_trait::async_trait]
impl AiProvider for OpenAiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(map_openai_error)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &String::from_utf8_lossy(&body)));
        }

        let completion: CreateChatCompletionResponse = serde_json::from_slice(&body)?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::EmptyCompletion(self.model.clone()))
    }
}
