//! Services module
//!
//! Contains the completion relay and its upstream integrations.

pub mod credential;
pub mod relay;

pub use credential::{Credential, SigningKey, TokenClaims};
pub use relay::{CompletionRelay, RelayError, SYSTEM_PROMPT};
