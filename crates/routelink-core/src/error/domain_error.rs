//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
///
/// None of these ever cross the transport boundary: the gateway logs them and drops the
/// offending event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("Invalid request id: {0:?}")]
    InvalidRequestId(String),

    #[error("Invalid connection id: {0}")]
    InvalidConnectionId(String),

    #[error("Invalid request status: {0:?}")]
    InvalidRequestStatus(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl DomainError {
    /// Get an error code string for logs and diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUserId(_) => "INVALID_USER_ID",
            Self::InvalidRequestId(_) => "INVALID_REQUEST_ID",
            Self::InvalidConnectionId(_) => "INVALID_CONNECTION_ID",
            Self::InvalidRequestStatus(_) => "INVALID_REQUEST_STATUS",
            Self::MissingField(_) => "MISSING_FIELD",
        }
    }
}
