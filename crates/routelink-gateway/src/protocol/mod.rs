//! Relay wire protocol
//!
//! Every WebSocket text frame is a JSON object `{"event": <name>, "data": <payload>}`.

mod close_codes;
mod error;
mod event_names;
mod messages;
mod payloads;

pub use close_codes::CloseCode;
pub use error::ProtocolError;
pub use event_names::EventName;
pub use messages::{ClientFrame, RelayFrame};
pub use payloads::{HelloPayload, JoinPayload, RequestUpdatePayload, SendMessagePayload};
