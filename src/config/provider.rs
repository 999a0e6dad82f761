//! Completion provider definitions
//!
//! Static description of the two upstream completion APIs the relay can
//! talk to: where they live, which model to ask for, how requests are
//! authorized and which sampling parameters are sent.

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

pub const ZHIPU_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
pub const ZHIPU_MODEL: &str = "glm-4";

/// Upstream completion provider
///
/// Deserializes through [`FromStr`](std::str::FromStr), so names are
/// case-insensitive and `glm` is accepted for Zhipu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[value(name = "deepseek")]
    DeepSeek,
    #[value(alias = "glm")]
    Zhipu,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::DeepSeek, ProviderId::Zhipu];

    /// Environment variable holding this provider's credential
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderId::Zhipu => "ZHIPU_API_KEY",
        }
    }

    /// How requests to this provider are authorized
    pub fn auth_scheme(&self) -> AuthScheme {
        match self {
            ProviderId::DeepSeek => AuthScheme::Bearer,
            ProviderId::Zhipu => AuthScheme::SignedToken,
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => DEEPSEEK_API_URL,
            ProviderId::Zhipu => ZHIPU_API_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => DEEPSEEK_MODEL,
            ProviderId::Zhipu => ZHIPU_MODEL,
        }
    }

    /// Sampling parameters sent with every request to this provider
    pub fn default_sampling(&self) -> SamplingParams {
        match self {
            ProviderId::DeepSeek => SamplingParams {
                temperature: 0.7,
                top_p: None,
                max_tokens: 1000,
                stream: None,
            },
            ProviderId::Zhipu => SamplingParams {
                temperature: 0.7,
                top_p: Some(0.7),
                max_tokens: 1000,
                stream: Some(false),
            },
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::DeepSeek => write!(f, "deepseek"),
            ProviderId::Zhipu => write!(f, "zhipu"),
        }
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        ProviderId::DeepSeek
    }
}

impl std::str::FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deepseek" => Ok(ProviderId::DeepSeek),
            "zhipu" | "glm" => Ok(ProviderId::Zhipu),
            _ => anyhow::bail!("Invalid provider: {}. Expected: deepseek or zhipu", s),
        }
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Authorization scheme used for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <api key>`
    Bearer,
    /// `Authorization: <HS256 token signed with the key secret>`
    SignedToken,
}

/// Sampling parameters forwarded to the completion API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub max_tokens: u32,
    pub stream: Option<bool>,
}

/// Everything the relay needs to call one provider
#[derive(Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub endpoint: String,
    pub model: String,
    pub auth: AuthScheme,
    pub sampling: SamplingParams,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// Provider config with the built-in endpoint, model and sampling
    pub fn new(id: ProviderId, api_key: Option<String>) -> Self {
        Self {
            id,
            endpoint: id.default_endpoint().to_string(),
            model: id.default_model().to_string(),
            auth: id.auth_scheme(),
            sampling: id.default_sampling(),
            api_key,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The configured credential, if it is present and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn has_credential(&self) -> bool {
        self.api_key().is_some()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("auth", &self.auth)
            .field("sampling", &self.sampling)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("deepseek".parse::<ProviderId>().unwrap(), ProviderId::DeepSeek);
        assert_eq!("DeepSeek".parse::<ProviderId>().unwrap(), ProviderId::DeepSeek);
        assert_eq!("zhipu".parse::<ProviderId>().unwrap(), ProviderId::Zhipu);
        assert_eq!("glm".parse::<ProviderId>().unwrap(), ProviderId::Zhipu);
        assert!("openai".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_provider_serde_names() {
        let id: ProviderId = serde_json::from_str("\"glm\"").unwrap();
        assert_eq!(id, ProviderId::Zhipu);
        let id: ProviderId = serde_json::from_str("\"DeepSeek\"").unwrap();
        assert_eq!(id, ProviderId::DeepSeek);
        let id: ProviderId = serde_json::from_str("\"ZHIPU\"").unwrap();
        assert_eq!(id, ProviderId::Zhipu);
        assert_eq!(serde_json::to_string(&ProviderId::DeepSeek).unwrap(), "\"deepseek\"");
        assert_eq!(ProviderId::Zhipu.to_string(), "zhipu");
    }

    #[test]
    fn test_auth_schemes() {
        assert_eq!(ProviderId::DeepSeek.auth_scheme(), AuthScheme::Bearer);
        assert_eq!(ProviderId::Zhipu.auth_scheme(), AuthScheme::SignedToken);
    }

    #[test]
    fn test_default_sampling() {
        let deepseek = ProviderId::DeepSeek.default_sampling();
        assert_eq!(deepseek.max_tokens, 1000);
        assert!(deepseek.top_p.is_none());
        assert!(deepseek.stream.is_none());

        let zhipu = ProviderId::Zhipu.default_sampling();
        assert_eq!(zhipu.top_p, Some(0.7));
        assert_eq!(zhipu.stream, Some(false));
    }

    #[test]
    fn test_blank_api_key_is_not_a_credential() {
        let config = ProviderConfig::new(ProviderId::DeepSeek, Some("   ".to_string()));
        assert!(!config.has_credential());

        let config = ProviderConfig::new(ProviderId::DeepSeek, Some("sk-test".to_string()));
        assert_eq!(config.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::new(ProviderId::Zhipu, Some("id.secret".to_string()));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
