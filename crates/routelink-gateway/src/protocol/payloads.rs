//! Frame payload definitions
//!
//! Inbound payloads keep every field optional so that a missing field is reported as a
//! validation error naming the field, not as an opaque JSON error.

use routelink_core::{
    ChatMessage, ConnectionId, ConversationId, DomainError, RelayCommand, RequestId,
    RequestStatus, RequestUpdate, UserId,
};
use serde::{Deserialize, Serialize};

/// Payload for `hello`
///
/// Sent by the server immediately after the upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    /// Server-assigned id of this connection
    pub connection_id: ConnectionId,
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn new(connection_id: ConnectionId, heartbeat_interval: u64) -> Self {
        Self {
            connection_id,
            heartbeat_interval,
        }
    }
}

/// Payload for `join`
///
/// Clients send either the bare user id or `{"userId": "..."}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JoinPayload {
    UserId(String),
    Object {
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
}

impl TryFrom<JoinPayload> for RelayCommand {
    type Error = DomainError;

    fn try_from(payload: JoinPayload) -> Result<Self, Self::Error> {
        let raw = match payload {
            JoinPayload::UserId(raw) => raw,
            JoinPayload::Object { user_id } => user_id.ok_or(DomainError::MissingField("userId"))?,
        };
        Ok(Self::Join {
            user_id: UserId::parse(raw)?,
        })
    }
}

/// Payload for `sendMessage`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

impl TryFrom<SendMessagePayload> for RelayCommand {
    type Error = DomainError;

    fn try_from(payload: SendMessagePayload) -> Result<Self, Self::Error> {
        let receiver_id = payload
            .receiver_id
            .ok_or(DomainError::MissingField("receiverId"))?;
        let sender_id = payload
            .sender_id
            .ok_or(DomainError::MissingField("senderId"))?;
        let chat_id = payload.chat_id.ok_or(DomainError::MissingField("chatId"))?;
        let body = payload.message.ok_or(DomainError::MissingField("message"))?;

        Ok(Self::SendMessage(ChatMessage {
            conversation_id: ConversationId::parse(chat_id)?,
            sender_id: UserId::parse(sender_id)?,
            receiver_id: UserId::parse(receiver_id)?,
            body,
        }))
    }
}

/// Payload for `requestUpdate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUpdatePayload {
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TryFrom<RequestUpdatePayload> for RelayCommand {
    type Error = DomainError;

    fn try_from(payload: RequestUpdatePayload) -> Result<Self, Self::Error> {
        let receiver_id = payload
            .receiver_id
            .ok_or(DomainError::MissingField("receiverId"))?;
        let request_id = payload
            .request_id
            .ok_or(DomainError::MissingField("requestId"))?;
        let status = payload.status.ok_or(DomainError::MissingField("status"))?;

        Ok(Self::RequestUpdate(RequestUpdate {
            request_id: RequestId::parse(request_id)?,
            receiver_id: UserId::parse(receiver_id)?,
            status: RequestStatus::parse(status)?,
        }))
    }
}
