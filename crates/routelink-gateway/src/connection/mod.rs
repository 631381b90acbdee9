//! Connection management
//!
//! Tracks live WebSocket connections and routes relayed events into their outbound queues.

mod connection;
mod manager;

pub use connection::Connection;
pub use manager::ConnectionManager;
