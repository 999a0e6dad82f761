//! Request and response schemas
//!
//! `chat` is the inbound HTTP surface; `completion` is what goes over the
//! wire to the upstream providers.

pub mod chat;
pub mod completion;

pub use chat::{ChatReply, ChatRequest, ErrorBody};
pub use completion::{CompletionMessage, CompletionRequest, CompletionResponse, Role};
