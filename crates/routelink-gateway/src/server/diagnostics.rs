//! Diagnostics and health endpoints

use axum::{extract::State, Json};
use routelink_core::{ConnectionId, UserId};
use serde::Serialize;

use super::GatewayState;

/// Snapshot of the presence registry
#[derive(Debug, Serialize)]
pub struct ActiveConnectionsResponse {
    /// `[userId, connectionId]` pairs, sorted by user id
    pub active: Vec<(UserId, ConnectionId)>,
    pub count: usize,
}

/// Service health summary
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    /// Live WebSocket connections, joined or not
    pub connections: usize,
}

/// `GET /api/socket/active`
pub async fn active_connections(State(state): State<GatewayState>) -> Json<ActiveConnectionsResponse> {
    let mut active: Vec<(UserId, ConnectionId)> = state
        .registry()
        .list_active()
        .into_iter()
        .map(|entry| (entry.user_id, entry.connection_id))
        .collect();
    active.sort();

    Json(ActiveConnectionsResponse {
        count: active.len(),
        active,
    })
}

/// `GET /api/health`
pub async fn api_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
        connections: state.connection_manager().connection_count(),
    })
}

/// `GET /health`
pub async fn health_check() -> &'static str {
    "OK"
}
