//! Integration test utilities for the relay gateway
//!
//! Spawns the real gateway on a loopback port and drives it over WebSocket and HTTP.

pub mod helpers;

pub use helpers::*;
