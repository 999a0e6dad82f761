//! Utility modules
//!
//! Contains retry logic and text helpers.

pub mod excerpt;
pub mod retry;

pub use excerpt::{excerpt, MAX_EXCERPT_CHARS};
pub use retry::{RetryOutcome, RetryPolicy};
