use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use vigil_core::WireDetection;

use crate::config::ServerConfig;
use crate::state::ServerState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub mode: String,
    pub connected_clients: usize,
    pub uptime_seconds: u64,
}

/// System status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub mode: String,
    pub modules: ModuleStatus,
    pub connected_clients: usize,
    pub latest_detection: Option<WireDetection>,
}

/// Per-source liveness
#[derive(Debug, Serialize)]
pub struct ModuleStatus {
    pub camera: bool,
    pub rssi: bool,
    pub csi: bool,
    pub monitor: bool,
    pub fusion: bool,
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<Arc<ServerState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.config.mode.as_str().to_string(),
        connected_clients: state.hub.subscriber_count(),
        uptime_seconds: state.uptime_seconds(),
    };
    (StatusCode::OK, Json(response))
}

/// System status endpoint
pub async fn get_status(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        mode: state.config.mode.as_str().to_string(),
        modules: ModuleStatus {
            camera: state.vision_active(),
            rssi: state.config.rssi.enabled,
            csi: state.config.csi.enabled,
            monitor: state.config.monitor.enabled,
            fusion: state.config.fusion_enabled(),
        },
        connected_clients: state.hub.subscriber_count(),
        latest_detection: state.hub.latest_event().as_ref().map(WireDetection::from),
    })
}

/// Resolved configuration endpoint
pub async fn get_config(State(state): State<Arc<ServerState>>) -> Json<ServerConfig> {
    Json(state.config.clone())
}
