//! Relay dispatching
//!
//! Turns relay commands into presence changes and best-effort forwards.

mod dispatcher;

pub use dispatcher::{DropReason, Forward, RelayDispatcher, RelayOutcome};
