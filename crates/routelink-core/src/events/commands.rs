//! Inbound relay commands
//!
//! Every transport event that matters to the relay is turned into one [`RelayCommand`]. The
//! connection it arrived on travels alongside, never inside, the command.

use crate::value_objects::{ConversationId, RequestId, RequestStatus, UserId};

/// A chat message as seen by the relay
///
/// The body is forwarded untouched; durable storage is the persistence layer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub body: String,
}

/// A connection-request status change to push to the request's other party
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUpdate {
    pub request_id: RequestId,
    pub receiver_id: UserId,
    pub status: RequestStatus,
}

/// Commands consumed by the relay dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCommand {
    /// Bind the issuing connection to a user identity
    Join { user_id: UserId },
    /// Forward a chat message to its receiver if online
    SendMessage(ChatMessage),
    /// Forward a request status change to its receiver if online
    RequestUpdate(RequestUpdate),
    /// The issuing connection has closed
    Disconnect,
}

impl RelayCommand {
    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::SendMessage(_) => "sendMessage",
            Self::RequestUpdate(_) => "requestUpdate",
            Self::Disconnect => "disconnect",
        }
    }
}
