//! OpenAI-compatible chat-completions client over reqwest.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::{ChatMessage, Completion, CompletionClient, LlmConfig};

const PROVIDER: &str = "openai-compatible";

/// Default token budget for multi-turn chat calls.
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 128;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for any endpoint accepting the OpenAI chat-completions body.
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiCompatClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { http, config })
    }

    /// Multi-turn chat. Messages alternate user/assistant starting with the
    /// user, so an odd count is required. The model name is not sent.
    pub async fn chat(&self, messages: &[String], max_tokens: u32) -> Result<Completion, LlmError> {
        let turns = alternate_roles(messages)?;
        let body = ChatCompletionRequest {
            messages: &turns,
            max_tokens,
            model: None,
        };
        self.post(&body).await
    }

    /// `chat` with the default token budget.
    pub async fn chat_default(&self, messages: &[String]) -> Result<Completion, LlmError> {
        self.chat(messages, DEFAULT_CHAT_MAX_TOKENS).await
    }

    async fn post(&self, body: &ChatCompletionRequest<'_>) -> Result<Completion, LlmError> {
        let key = self.config.api_key.expose_secret();
        let response = self
            .http
            .post(&self.config.base_url)
            .header("api-key", key)
            .bearer_auth(key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("Failed to read response body: {e}"),
        })?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Completion request rejected");
            return Ok(Completion::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = parse_chat_response(&text)?;
        debug!(chars = content.len(), "Completion received");
        Ok(Completion::Generated(content))
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<Completion, LlmError> {
        let messages = [ChatMessage::user(prompt)];
        let body = ChatCompletionRequest {
            messages: &messages,
            max_tokens,
            model: Some(&self.config.model),
        };
        self.post(&body).await
    }
}

/// Pair each message with its role, user first.
fn alternate_roles(messages: &[String]) -> Result<Vec<ChatMessage>, LlmError> {
    if messages.len() % 2 != 1 {
        return Err(LlmError::InvalidRequest(format!(
            "chat needs an odd number of messages ending on a user turn, got {}",
            messages.len()
        )));
    }
    Ok(messages
        .iter()
        .enumerate()
        .map(|(i, content)| {
            if i % 2 == 0 {
                ChatMessage::user(content.as_str())
            } else {
                ChatMessage::assistant(content.as_str())
            }
        })
        .collect())
}

/// Pull `choices[0].message.content` out of a successful response body.
fn parse_chat_response(body: &str) -> Result<String, LlmError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "response has no choices[0].message.content".to_string(),
        })
}
