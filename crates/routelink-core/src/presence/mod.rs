//! Presence tracking
//!
//! Live mapping from user identity to the connection currently registered for it.

mod registry;

pub(crate) use registry::PresenceTable;
pub use registry::{PresenceEntry, PresenceRegistry, Registration};
