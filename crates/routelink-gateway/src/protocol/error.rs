//! Frame decoding errors

use routelink_core::DomainError;
use thiserror::Error;

/// Why an inbound frame could not be turned into something the relay understands
///
/// Every variant means "ignore this frame"; none of them closes the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not JSON, or JSON of the wrong shape
    #[error("Invalid frame: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Event name the relay does not accept from clients
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Event that needs a payload arrived without one
    #[error("Missing data for event: {0}")]
    MissingData(&'static str),

    /// Payload parsed but failed validation
    #[error(transparent)]
    InvalidPayload(#[from] DomainError),
}

impl ProtocolError {
    /// Error code string for logs
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "INVALID_JSON",
            Self::UnknownEvent(_) => "UNKNOWN_EVENT",
            Self::MissingData(_) => "MISSING_DATA",
            Self::InvalidPayload(e) => e.code(),
        }
    }
}
