//! Configuration management module
//!
//! This module handles loading and validating application configuration
//! from environment variables and .env files.

pub mod provider;
pub mod settings;

pub use provider::{AuthScheme, ProviderConfig, ProviderId, SamplingParams};
pub use settings::{Environment, RelayConfig, Settings};
