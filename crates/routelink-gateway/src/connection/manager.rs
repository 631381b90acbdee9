//! Connection manager
//!
//! Manages all live WebSocket connections using DashMap for thread-safe access, and delivers
//! relayed events to them as the relay's [`Outbound`] port.

use super::Connection;
use crate::protocol::RelayFrame;
use dashmap::DashMap;
use routelink_core::{ConnectionId, Outbound, OutboundError, OutboundEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all live WebSocket connections
///
/// Knows nothing about user identities; that is the presence registry's job.
pub struct ConnectionManager {
    /// Live connections by id
    connections: DashMap<ConnectionId, Arc<Connection>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(
        &self,
        id: ConnectionId,
        sender: mpsc::Sender<RelayFrame>,
    ) -> Arc<Connection> {
        let connection = Connection::new(id, sender);
        self.connections.insert(id, connection.clone());

        tracing::debug!(connection_id = %id, "Connection added");

        connection
    }

    /// Remove a connection
    pub fn remove_connection(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        let removed = self.connections.remove(&id).map(|(_, connection)| connection);
        if removed.is_some() {
            tracing::debug!(connection_id = %id, "Connection removed");
        }
        removed
    }

    /// Get a connection by id
    pub fn get_connection(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(&id).map(|r| r.clone())
    }

    /// Check if a connection exists
    pub fn has_connection(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Get the total number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Outbound for ConnectionManager {
    fn forward(&self, id: ConnectionId, event: &OutboundEvent) -> Result<(), OutboundError> {
        let connection = self
            .get_connection(id)
            .ok_or(OutboundError::UnknownConnection(id))?;

        let frame =
            RelayFrame::from_outbound(event).map_err(|e| OutboundError::Encode(e.to_string()))?;

        connection.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => OutboundError::QueueFull(id),
            mpsc::error::TrySendError::Closed(_) => OutboundError::Closed(id),
        })
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .finish()
    }
}
