//! # routelink-core
//!
//! Domain layer for the real-time relay: identifiers, relay events, the presence registry,
//! and the relay dispatcher that routes point-to-point events to connected users.
//! This crate has zero dependencies on the transport (WebSocket, HTTP, etc.).

pub mod error;
pub mod events;
pub mod presence;
pub mod relay;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::DomainError;
pub use events::{
    ChatMessage, OutboundEvent, ReceiveMessageEvent, RelayCommand, RequestStatusChangedEvent,
    RequestUpdate,
};
pub use presence::{PresenceEntry, PresenceRegistry, Registration};
pub use relay::{DropReason, Forward, RelayDispatcher, RelayOutcome};
pub use traits::{Outbound, OutboundError};
pub use value_objects::{ConnectionId, ConversationId, RequestId, RequestStatus, UserId};
