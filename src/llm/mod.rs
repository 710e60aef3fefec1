//! LLM integration for arxiv-digest.
//!
//! The completion endpoint speaks the OpenAI chat-completions format. Any
//! gateway that accepts that body works, whether it authenticates with an
//! `api-key` header or with bearer auth: both are sent.

pub mod openai;
pub mod reasoning;

pub use openai::OpenAiCompatClient;
pub use reasoning::strip_reasoning;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Configuration for creating a completion client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    /// Full URL of the chat-completions endpoint.
    pub base_url: String,
    pub model: String,
    /// Token budget for each summary completion.
    pub max_tokens: u32,
    /// Per-request timeout for completion calls.
    pub timeout: Duration,
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message in the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Outcome of a completion call that reached the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// HTTP 200 with generated text.
    Generated(String),
    /// Any other status. The body is kept verbatim.
    Rejected { status: u16, body: String },
}

impl Completion {
    /// The text a caller should use: generated content, or the raw body
    /// of a rejected call.
    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) => text,
            Self::Rejected { body, .. } => body,
        }
    }
}

/// Trait for completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;

    /// Send a single-turn prompt with the given token budget.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<Completion, LlmError>;
}

/// Create a completion client from configuration.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>, LlmError> {
    let client: Arc<dyn CompletionClient> = Arc::new(OpenAiCompatClient::new(config.clone())?);
    tracing::info!(
        "Using OpenAI-compatible endpoint {} (model: {})",
        config.base_url,
        client.model_name()
    );
    Ok(client)
}
