//! Chat endpoint schema definitions
//!
//! Request and response bodies of `POST /chat`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::ProviderId;

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    /// The user's message
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,

    /// Provider override for this message; the configured default otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
}

impl ChatRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            provider: None,
        }
    }
}

/// Successful reply of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Model-generated text, exactly as returned by the provider
    pub response: String,
}

/// Error body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
