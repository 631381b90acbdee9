//! Gateway server setup
//!
//! Provides the WebSocket relay server configuration and routes.

mod diagnostics;
mod handler;
mod middleware;
mod response;
mod state;

pub use diagnostics::{ActiveConnectionsResponse, HealthResponse};
pub use handler::socket_handler;
pub use middleware::{create_cors_layer, REQUEST_ID_HEADER};
pub use response::ApiError;
pub use state::GatewayState;

use axum::{routing::get, Router};
use routelink_common::{AppConfig, AppError};
use tokio::net::TcpListener;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/socket", get(socket_handler))
        .route("/health", get(diagnostics::health_check))
        .route("/api/health", get(diagnostics::api_health))
        .route("/api/socket/active", get(diagnostics::active_connections))
        .fallback(response::not_found)
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    let cors = state.config().cors.clone();
    let is_production = state.config().app.env.is_production();

    middleware::apply_middleware(create_router().with_state(state), &cors, is_production)
}

/// Create `GatewayState` from configuration
pub fn create_gateway_state(config: AppConfig) -> GatewayState {
    tracing::debug!(
        outbound_buffer = config.relay.outbound_buffer,
        heartbeat_interval_ms = config.relay.heartbeat_interval_ms,
        heartbeat_timeout_ms = config.relay.heartbeat_timeout_ms,
        "Creating gateway state"
    );
    GatewayState::new(config)
}

/// Serve the application on an already-bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on ws://{}/socket", addr);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    // Create gateway state
    let state = create_gateway_state(config);

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, &addr).await
}
