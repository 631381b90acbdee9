//! Conversation identity
//!
//! Both participants derive the same id independently: the two user ids, sorted, joined by
//! [`ConversationId::SEPARATOR`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::UserId;
use crate::error::DomainError;

/// Identifier grouping all messages between two users
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Separator between the two sorted participant ids
    pub const SEPARATOR: char = '_';

    /// Derive the conversation id for a pair of users, independent of argument order
    #[must_use]
    pub fn between(a: &UserId, b: &UserId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{first}{}{second}", Self::SEPARATOR))
    }

    /// Accept a client-supplied conversation id as-is
    ///
    /// The relay forwards conversation ids opaquely; only emptiness is rejected.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::MissingField("chatId"));
        }
        Ok(Self(raw))
    }

    /// Check whether this id is the one derived for the given pair
    #[must_use]
    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        *self == Self::between(a, b)
    }

    /// Borrow the raw identifier
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConversationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}
