//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection: its id, its outbound queue and its liveness clock.

use crate::protocol::RelayFrame;
use parking_lot::Mutex;
use routelink_core::ConnectionId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A single WebSocket connection
pub struct Connection {
    /// Server-assigned connection id
    id: ConnectionId,

    /// Channel to the socket writer task
    sender: mpsc::Sender<RelayFrame>,

    /// Last time anything arrived from the client
    last_activity: Mutex<Instant>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(id: ConnectionId, sender: mpsc::Sender<RelayFrame>) -> Arc<Self> {
        let now = Instant::now();
        Arc::new(Self {
            id,
            sender,
            last_activity: Mutex::new(now),
            created_at: now,
        })
    }

    /// Get the connection id
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Record that the client sent something
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    /// Time since the client last sent anything
    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Try to queue a frame (non-blocking)
    pub fn try_send(&self, frame: RelayFrame) -> Result<(), mpsc::error::TrySendError<RelayFrame>> {
        self.sender.try_send(frame)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("age", &self.age())
            .finish()
    }
}
