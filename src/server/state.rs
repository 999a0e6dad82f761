//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use crate::config::Settings;
use crate::services::CompletionRelay;
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
///
/// Immutable after start-up and cheaply cloneable; every request task gets
/// its own clone.
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Relay to the completion providers
    pub relay: Arc<CompletionRelay>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);

        tracing::debug!("Creating completion relay");
        let relay = CompletionRelay::from_settings(&settings)
            .context("Failed to build HTTP client for completion relay")?;

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            settings,
            relay: Arc::new(relay),
            start_time: Instant::now(),
        })
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
