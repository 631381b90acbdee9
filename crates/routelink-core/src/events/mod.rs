//! Relay events
//!
//! Inbound commands the relay consumes and outbound events it forwards to connected users.

mod commands;
mod outbound;

pub use commands::{ChatMessage, RelayCommand, RequestUpdate};
pub use outbound::{OutboundEvent, ReceiveMessageEvent, RequestStatusChangedEvent};
