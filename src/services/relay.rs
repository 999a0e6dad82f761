//! Completion relay
//!
//! Forwards one chat message to the selected provider, wrapped in the
//! music-companion persona, and hands back the model's reply text.

use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderId, Settings};
use crate::schemas::{ChatReply, CompletionRequest, CompletionResponse};
use crate::services::credential::Credential;
use crate::utils::{excerpt, RetryPolicy, MAX_EXCERPT_CHARS};

/// Persona sent as the system message of every conversation
pub const SYSTEM_PROMPT: &str = "You are a music companion with deep knowledge of music theory and composition. You:
1. Answer questions concisely, in clear and professional language
2. Give concrete suggestions and examples
3. Whenever chords come up, give both the chord symbol and its individual notes
4. Reply in the same language the user writes in";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while relaying a message
#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing or malformed credential; never retried
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport failure or non-2xx status
    #[error("{provider} request failed: {message}")]
    Transient {
        provider: ProviderId,
        status: Option<u16>,
        message: String,
    },

    /// 2xx response without a usable reply
    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse { provider: ProviderId, message: String },
}

impl RelayError {
    fn transport(provider: ProviderId, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        RelayError::Transient {
            provider,
            status: None,
            message,
        }
    }

    fn status(provider: ProviderId, status: u16, body: &str) -> Self {
        RelayError::Transient {
            provider,
            status: Some(status),
            message: format!("HTTP {}: {}", status, excerpt(body, MAX_EXCERPT_CHARS)),
        }
    }

    fn malformed(provider: ProviderId, message: impl Into<String>) -> Self {
        RelayError::MalformedResponse {
            provider,
            message: message.into(),
        }
    }

    /// Transient and malformed-response failures are retried;
    /// configuration errors are not
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RelayError::Configuration(_))
    }
}

// ============================================================================
// Completion Relay
// ============================================================================

/// Relay from the chat endpoint to the upstream completion APIs
///
/// Holds immutable provider configuration and a pooled HTTP client; cheap to
/// share behind an `Arc` across request tasks.
#[derive(Debug, Clone)]
pub struct CompletionRelay {
    client: Client,
    deepseek: ProviderConfig,
    zhipu: ProviderConfig,
    default_provider: ProviderId,
    retry: RetryPolicy,
}

impl CompletionRelay {
    /// Create a relay
    ///
    /// `request_timeout` bounds every single attempt.
    pub fn new(
        deepseek: ProviderConfig,
        zhipu: ProviderConfig,
        default_provider: ProviderId,
        retry: RetryPolicy,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;

        tracing::info!(
            default_provider = %default_provider,
            deepseek_configured = deepseek.has_credential(),
            zhipu_configured = zhipu.has_credential(),
            max_attempts = retry.max_attempts,
            retry_delay_ms = retry.delay.as_millis() as u64,
            timeout_secs = request_timeout.as_secs(),
            "Initialized completion relay"
        );

        Ok(Self {
            client,
            deepseek,
            zhipu,
            default_provider,
            retry,
        })
    }

    /// Create a relay from application settings
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        Self::new(
            settings.deepseek.clone(),
            settings.zhipu.clone(),
            settings.default_provider,
            RetryPolicy::new(settings.relay.max_attempts, settings.relay.retry_delay()),
            settings.relay.request_timeout(),
        )
    }

    pub fn default_provider(&self) -> ProviderId {
        self.default_provider
    }

    pub fn provider(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::DeepSeek => &self.deepseek,
            ProviderId::Zhipu => &self.zhipu,
        }
    }

    /// Whether `id` has a credential that would be accepted locally
    pub fn is_configured(&self, id: ProviderId) -> bool {
        Credential::resolve(self.provider(id)).is_ok()
    }

    /// Relay `message` to `provider` (or the default provider) and return
    /// the first choice's content unmodified
    pub async fn relay(
        &self,
        message: &str,
        provider: Option<ProviderId>,
    ) -> Result<ChatReply, RelayError> {
        let config = self.provider(provider.unwrap_or(self.default_provider));

        let credential = Credential::resolve(config).map_err(|e| {
            tracing::error!(provider = %config.id, error = %e, "Provider is not usable");
            e
        })?;
        let payload = CompletionRequest::new(config, SYSTEM_PROMPT, message);

        let start = Instant::now();
        let credential = &credential;
        let payload = &payload;
        let outcome = self
            .retry
            .run(RelayError::is_retryable, move |attempt| {
                self.attempt(config, credential, payload, attempt)
            })
            .await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match outcome.result {
            Ok(response) => {
                tracing::info!(
                    provider = %config.id,
                    attempts = outcome.attempts,
                    duration_ms = %format!("{:.2}", duration_ms),
                    response_chars = response.chars().count(),
                    "Relayed chat message"
                );
                Ok(ChatReply { response })
            }
            Err(e) => {
                tracing::error!(
                    provider = %config.id,
                    attempts = outcome.attempts,
                    duration_ms = %format!("{:.2}", duration_ms),
                    error = %e,
                    "Failed to relay chat message"
                );
                Err(e)
            }
        }
    }

    /// One POST to the provider
    async fn attempt(
        &self,
        config: &ProviderConfig,
        credential: &Credential,
        payload: &CompletionRequest,
        attempt: u32,
    ) -> Result<String, RelayError> {
        tracing::debug!(
            provider = %config.id,
            model = %config.model,
            url = %config.endpoint,
            attempt,
            "Calling completion API"
        );

        let request = credential.authorize(self.client.post(&config.endpoint).json(payload))?;

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::transport(config.id, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::transport(config.id, e))?;

        if !status.is_success() {
            return Err(RelayError::status(config.id, status.as_u16(), &body));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                provider = %config.id,
                error = %e,
                body = %excerpt(&body, MAX_EXCERPT_CHARS),
                "Failed to parse completion response"
            );
            RelayError::malformed(config.id, format!("invalid JSON: {}", e))
        })?;

        let content = parsed
            .first_content()
            .ok_or_else(|| RelayError::malformed(config.id, "no message content in choices"))?;

        tracing::debug!(
            provider = %config.id,
            completion_id = parsed.id.as_deref().unwrap_or("-"),
            attempt,
            "Completion API call succeeded"
        );

        Ok(content.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
