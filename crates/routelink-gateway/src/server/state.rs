//! Gateway state
//!
//! Application state for the gateway server.

use crate::connection::ConnectionManager;
use routelink_common::AppConfig;
use routelink_core::{PresenceRegistry, RelayDispatcher};
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server. The presence registry is created
/// once here and shared with the dispatcher.
#[derive(Clone)]
pub struct GatewayState {
    /// Live connections and their outbound queues
    connection_manager: Arc<ConnectionManager>,
    /// Routes relay commands through the presence registry
    dispatcher: Arc<RelayDispatcher>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Wire a fresh registry, connection manager and dispatcher together
    pub fn new(config: AppConfig) -> Self {
        let registry = Arc::new(PresenceRegistry::new());
        let connection_manager = ConnectionManager::new_shared();
        let dispatcher = RelayDispatcher::new(registry, connection_manager.clone());

        Self::from_parts(connection_manager, dispatcher, config)
    }

    /// Build state around an existing dispatcher
    pub fn from_parts(
        connection_manager: Arc<ConnectionManager>,
        dispatcher: RelayDispatcher,
        config: AppConfig,
    ) -> Self {
        Self {
            connection_manager,
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
        }
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    /// Get the relay dispatcher
    pub fn dispatcher(&self) -> &RelayDispatcher {
        &self.dispatcher
    }

    /// Get the presence registry
    pub fn registry(&self) -> &PresenceRegistry {
        self.dispatcher.registry()
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("dispatcher", &self.dispatcher)
            .field("config", &"AppConfig")
            .finish()
    }
}
