//! Health check endpoints
//!
//! This module provides health check endpoints for monitoring
//! and container orchestration (Kubernetes, ECS, etc.)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::config::ProviderId;
use crate::server::state::AppState;

/// Response for the main health check endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub default_provider: ProviderId,
}

/// Response for readiness check
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub default_provider: ProviderId,
    pub providers: Vec<ProviderStatus>,
}

/// Credential status of one provider
#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderId,
    pub configured: bool,
}

/// Response for liveness check
#[derive(Serialize)]
pub struct LivenessResponse {
    pub alive: bool,
}

/// Main health check endpoint
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.settings.app_version.clone(),
        environment: state.settings.environment.to_string(),
        uptime_seconds: state.uptime_seconds(),
        default_provider: state.relay.default_provider(),
    })
}

/// Readiness endpoint
///
/// Ready when the default provider has a usable credential. The other
/// provider is reported but does not affect readiness.
///
/// GET /ready
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let default_provider = state.relay.default_provider();
    let providers: Vec<ProviderStatus> = ProviderId::ALL
        .iter()
        .map(|&provider| ProviderStatus {
            provider,
            configured: state.relay.is_configured(provider),
        })
        .collect();

    let ready = state.relay.is_configured(default_provider);

    let status = if ready {
        StatusCode::OK
    } else {
        tracing::warn!(
            default_provider = %default_provider,
            providers = ?providers,
            "Service not ready"
        );
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            default_provider,
            providers,
        }),
    )
}

/// Liveness endpoint
///
/// GET /liveness
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { alive: true })
}
