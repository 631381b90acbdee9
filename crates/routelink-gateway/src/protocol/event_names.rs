//! Relay event names
//!
//! The values carried in the `event` field of every frame.

use std::fmt;
use std::str::FromStr;

use super::ProtocolError;

/// Relay event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    // Client -> server
    /// Bind this connection to a user id
    Join,
    /// Relay a chat message
    SendMessage,
    /// Relay a connection-request status change
    RequestUpdate,
    /// Liveness ping
    Heartbeat,

    // Server -> client
    /// First frame after the upgrade
    Hello,
    /// Relayed chat message
    ReceiveMessage,
    /// Relayed request status change
    RequestStatusChanged,
    /// Answer to `heartbeat`
    HeartbeatAck,
}

impl EventName {
    /// Get the wire representation of the event name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::SendMessage => "sendMessage",
            Self::RequestUpdate => "requestUpdate",
            Self::Heartbeat => "heartbeat",
            Self::Hello => "hello",
            Self::ReceiveMessage => "receiveMessage",
            Self::RequestStatusChanged => "requestStatusChanged",
            Self::HeartbeatAck => "heartbeatAck",
        }
    }

    /// Check if clients are allowed to send this event
    #[must_use]
    pub const fn is_client_event(self) -> bool {
        matches!(
            self,
            Self::Join | Self::SendMessage | Self::RequestUpdate | Self::Heartbeat
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join" => Ok(Self::Join),
            "sendMessage" => Ok(Self::SendMessage),
            "requestUpdate" => Ok(Self::RequestUpdate),
            "heartbeat" => Ok(Self::Heartbeat),
            "hello" => Ok(Self::Hello),
            "receiveMessage" => Ok(Self::ReceiveMessage),
            "requestStatusChanged" => Ok(Self::RequestStatusChanged),
            "heartbeatAck" => Ok(Self::HeartbeatAck),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}
