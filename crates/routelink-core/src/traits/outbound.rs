//! Outbound delivery port
//!
//! The relay decides *where* an event goes; the transport layer decides *how* it gets there.

use thiserror::Error;

use crate::events::OutboundEvent;
use crate::value_objects::ConnectionId;

/// Reasons a single forward attempt can fail
///
/// All of them are terminal for that event: forwards are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutboundError {
    #[error("Connection not found: {0}")]
    UnknownConnection(ConnectionId),

    #[error("Outbound queue full for connection {0}")]
    QueueFull(ConnectionId),

    #[error("Connection closed: {0}")]
    Closed(ConnectionId),

    #[error("Failed to encode event: {0}")]
    Encode(String),
}

/// Non-blocking delivery of an event to one live connection
///
/// Implementations must not block and must not call back into the presence registry: the
/// dispatcher invokes `forward` while holding the registry lock.
pub trait Outbound: Send + Sync {
    /// Hand `event` to the transport for `connection`
    fn forward(&self, connection: ConnectionId, event: &OutboundEvent) -> Result<(), OutboundError>;
}
