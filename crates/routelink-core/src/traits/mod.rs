//! Port traits - interfaces the domain needs and the transport layer implements

mod outbound;

pub use outbound::{Outbound, OutboundError};
