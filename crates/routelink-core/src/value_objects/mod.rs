//! Value objects - immutable types that represent domain concepts

mod connection_id;
mod conversation_id;
mod request;
mod user_id;

pub use connection_id::ConnectionId;
pub use conversation_id::ConversationId;
pub use request::{RequestId, RequestStatus};
pub use user_id::UserId;
