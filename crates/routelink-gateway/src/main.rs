//! Relay Gateway Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p routelink-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use routelink_common::{try_init_tracing_with_config, AppConfig, AppError, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first: it decides the log format
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the server
    if let Err(e) = run(config).await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        address = %config.gateway.address(),
        "Starting Relay Gateway Server..."
    );

    routelink_gateway::run(config).await
}
