//! Outbound relay events
//!
//! Payloads delivered to an online receiver. Field names match what browser clients expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, RequestUpdate};
use crate::value_objects::{ConversationId, RequestId, RequestStatus, UserId};

/// `receiveMessage` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveMessageEvent {
    pub sender_id: UserId,
    pub message: String,
    pub chat_id: ConversationId,
    /// Assigned by the server when the event is forwarded
    pub timestamp: DateTime<Utc>,
}

impl ReceiveMessageEvent {
    /// Build the event for a chat message, stamping it with `timestamp`
    #[must_use]
    pub fn from_message(message: ChatMessage, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender_id: message.sender_id,
            message: message.body,
            chat_id: message.conversation_id,
            timestamp,
        }
    }
}

/// `requestStatusChanged` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatusChangedEvent {
    pub request_id: RequestId,
    pub status: RequestStatus,
}

impl From<RequestUpdate> for RequestStatusChangedEvent {
    fn from(update: RequestUpdate) -> Self {
        Self {
            request_id: update.request_id,
            status: update.status,
        }
    }
}

/// Events the relay forwards to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    ReceiveMessage(ReceiveMessageEvent),
    RequestStatusChanged(RequestStatusChangedEvent),
}

impl OutboundEvent {
    /// Wire event name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReceiveMessage(_) => "receiveMessage",
            Self::RequestStatusChanged(_) => "requestStatusChanged",
        }
    }

    /// Serialize the payload (without the event name)
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::ReceiveMessage(event) => serde_json::to_value(event),
            Self::RequestStatusChanged(event) => serde_json::to_value(event),
        }
    }
}
