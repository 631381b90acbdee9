//! # routelink-gateway
//!
//! WebSocket relay for real-time messaging between route participants.
//! Clients join under a user id, and messages and request updates addressed to a user are
//! pushed to that user's live connection if there is one.

pub mod connection;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, serve, GatewayState};
