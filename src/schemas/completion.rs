//! Upstream chat-completion wire format
//!
//! Both providers speak the OpenAI-style `/chat/completions` dialect, so one
//! request type covers them; provider-specific fields are optional and left
//! out of the JSON when unset.

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

// ============================================================================
// Request Types
// ============================================================================

/// Completion request sent to a provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub temperature: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl CompletionRequest {
    /// Two-message conversation (system prompt, user message) with the
    /// provider's model and sampling parameters
    pub fn new(provider: &ProviderConfig, system_prompt: &str, user_message: &str) -> Self {
        Self {
            model: provider.model.clone(),
            messages: vec![
                CompletionMessage::system(system_prompt),
                CompletionMessage::user(user_message),
            ],
            temperature: provider.sampling.temperature,
            top_p: provider.sampling.top_p,
            max_tokens: provider.sampling.max_tokens,
            stream: provider.sampling.stream,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

impl CompletionMessage {
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

// ============================================================================
// Response Types
// ============================================================================

/// Completion response envelope; only the parts the relay reads
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Content of the first choice's message, if present
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}
