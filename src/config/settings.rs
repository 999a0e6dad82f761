//! Application settings and configuration
//!
//! This module provides configuration management for the application,
//! loading settings from environment variables with sensible defaults.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

use super::provider::{ProviderConfig, ProviderId};

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!(
                "Invalid environment: {}. Expected: development, staging, or production",
                s
            ),
        }
    }
}

/// Outbound call behaviour of the relay
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Total attempts per chat message, including the first one
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub retry_delay_ms: u64,
    /// Per-attempt HTTP timeout
    pub request_timeout_seconds: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 1000,
            request_timeout_seconds: 30,
        }
    }
}

impl RelayConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    // Providers
    pub default_provider: ProviderId,
    pub deepseek: ProviderConfig,
    pub zhipu: ProviderConfig,

    // Outbound calls
    pub relay: RelayConfig,

    /// Allowed browser origins; empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        let settings = Self {
            // App settings
            app_name: env_or_default("APP_NAME", "music-pal-relay"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            // Server settings
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8000")
                .parse()
                .context("Invalid PORT value")?,

            // Providers
            default_provider: env_or_default("LLM_PROVIDER", "deepseek")
                .parse()
                .context("Invalid LLM_PROVIDER value")?,
            deepseek: provider_from_env(ProviderId::DeepSeek, "DEEPSEEK"),
            zhipu: provider_from_env(ProviderId::Zhipu, "ZHIPU"),

            // Outbound calls
            relay: RelayConfig {
                max_attempts: env_or_default("RELAY_MAX_ATTEMPTS", "3")
                    .parse()
                    .context("Invalid RELAY_MAX_ATTEMPTS value")?,
                retry_delay_ms: env_or_default("RELAY_RETRY_DELAY_MS", "1000")
                    .parse()
                    .context("Invalid RELAY_RETRY_DELAY_MS value")?,
                request_timeout_seconds: env_or_default("RELAY_TIMEOUT_SECONDS", "30")
                    .parse()
                    .context("Invalid RELAY_TIMEOUT_SECONDS value")?,
            },

            cors_allowed_origins: parse_origins(&env_or_default("CORS_ALLOWED_ORIGINS", "")),
        };

        // Validate settings
        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.relay.max_attempts == 0 {
            anyhow::bail!("RELAY_MAX_ATTEMPTS must be > 0");
        }

        if self.relay.request_timeout_seconds == 0 {
            anyhow::bail!("RELAY_TIMEOUT_SECONDS must be > 0");
        }

        Ok(())
    }

    /// Get the configuration of one provider
    pub fn provider(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::DeepSeek => &self.deepseek,
            ProviderId::Zhipu => &self.zhipu,
        }
    }

    /// Whether the default provider has an API key at all
    ///
    /// A missing key is not a startup error; each chat request reports it.
    pub fn default_provider_has_credential(&self) -> bool {
        self.provider(self.default_provider).has_credential()
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "music-pal-relay".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            default_provider: ProviderId::DeepSeek,
            deepseek: ProviderConfig::new(ProviderId::DeepSeek, None),
            zhipu: ProviderConfig::new(ProviderId::Zhipu, None),
            relay: RelayConfig::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Build a provider config from `<PREFIX>_API_KEY`, `<PREFIX>_API_URL`
/// and `<PREFIX>_MODEL`
fn provider_from_env(id: ProviderId, prefix: &str) -> ProviderConfig {
    let mut config = ProviderConfig::new(id, env::var(format!("{}_API_KEY", prefix)).ok());
    if let Ok(url) = env::var(format!("{}_API_URL", prefix)) {
        config = config.with_endpoint(url);
    }
    if let Ok(model) = env::var(format!("{}_MODEL", prefix)) {
        config = config.with_model(model);
    }
    config
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
