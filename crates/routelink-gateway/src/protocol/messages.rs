//! Relay frame format
//!
//! Defines the envelope shared by every WebSocket text frame, in both directions.

use routelink_core::{OutboundEvent, RelayCommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    EventName, HelloPayload, JoinPayload, ProtocolError, RequestUpdatePayload, SendMessagePayload,
};

/// Relay frame
///
/// The event name stays a plain string on the wire so that an unknown name is reported as
/// such instead of as a JSON error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayFrame {
    /// Event name
    pub event: String,

    /// Event payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A decoded client frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// Something for the relay dispatcher
    Command(RelayCommand),
    /// Liveness ping, answered by the gateway itself
    Heartbeat,
}

impl RelayFrame {
    /// Create a frame for a known event
    #[must_use]
    pub fn new(event: EventName, data: Option<Value>) -> Self {
        Self {
            event: event.as_str().to_string(),
            data,
        }
    }

    // === Server Frames ===

    /// Create a `hello` frame
    pub fn hello(payload: &HelloPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventName::Hello, Some(serde_json::to_value(payload)?)))
    }

    /// Create a `heartbeatAck` frame
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::new(EventName::HeartbeatAck, None)
    }

    /// Wrap a relayed event
    pub fn from_outbound(event: &OutboundEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event: event.name().to_string(),
            data: Some(event.payload()?),
        })
    }

    // === Client Frames ===

    /// Decode into a client frame, validating the payload
    pub fn decode(self) -> Result<ClientFrame, ProtocolError> {
        let name: EventName = self.event.parse()?;
        if !name.is_client_event() {
            return Err(ProtocolError::UnknownEvent(self.event));
        }

        match name {
            EventName::Heartbeat => Ok(ClientFrame::Heartbeat),
            EventName::Join => {
                let data = self.data.ok_or(ProtocolError::MissingData("join"))?;
                let payload: JoinPayload = serde_json::from_value(data)?;
                Ok(ClientFrame::Command(RelayCommand::try_from(payload)?))
            }
            EventName::SendMessage => {
                let data = self.data.ok_or(ProtocolError::MissingData("sendMessage"))?;
                let payload: SendMessagePayload = serde_json::from_value(data)?;
                Ok(ClientFrame::Command(RelayCommand::try_from(payload)?))
            }
            EventName::RequestUpdate => {
                let data = self
                    .data
                    .ok_or(ProtocolError::MissingData("requestUpdate"))?;
                let payload: RequestUpdatePayload = serde_json::from_value(data)?;
                Ok(ClientFrame::Command(RelayCommand::try_from(payload)?))
            }
            // Server-only events are rejected above
            EventName::Hello
            | EventName::ReceiveMessage
            | EventName::RequestStatusChanged
            | EventName::HeartbeatAck => Err(ProtocolError::UnknownEvent(self.event)),
        }
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for RelayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RelayFrame(event={})", self.event)
    }
}
