//! Presence registry
//!
//! Process-wide mapping from user identity to the single connection registered for it.
//! Last registration wins: a user who reloads a tab is reachable on the new connection even
//! while the old one is still closing.
//!
//! Two maps are kept in lock-step under one mutex:
//! - `by_user`: user id -> connection id (what lookups read)
//! - `by_connection`: connection id -> user id (what disconnects read)
//!
//! Removal always starts from the exact connection id, so a belated disconnect of an
//! overwritten connection can never evict the newer one.

use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::collections::HashMap;

use crate::value_objects::{ConnectionId, UserId};

/// One (user, connection) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
}

/// What a `register` call changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Connection previously registered for this user, now unreachable through lookup
    pub replaced: Option<ConnectionId>,
    /// User previously bound to this connection, now offline
    pub unbound: Option<UserId>,
}

/// The registry state proper. Only reachable through the registry's lock.
#[derive(Debug, Default)]
pub(crate) struct PresenceTable {
    by_user: HashMap<UserId, ConnectionId>,
    by_connection: HashMap<ConnectionId, UserId>,
}

impl PresenceTable {
    pub(crate) fn register(&mut self, user_id: UserId, connection_id: ConnectionId) -> Registration {
        let mut outcome = Registration::default();

        // A connection speaks for one identity at a time; joining as someone else unbinds
        // the previous identity.
        if let Some(previous_user) = self.by_connection.get(&connection_id) {
            if *previous_user != user_id {
                let previous_user = previous_user.clone();
                if self.by_user.get(&previous_user) == Some(&connection_id) {
                    self.by_user.remove(&previous_user);
                }
                outcome.unbound = Some(previous_user);
            }
        }

        if let Some(previous) = self.by_user.insert(user_id.clone(), connection_id) {
            if previous != connection_id {
                self.by_connection.remove(&previous);
                outcome.replaced = Some(previous);
            }
        }
        self.by_connection.insert(connection_id, user_id);

        outcome
    }

    pub(crate) fn lookup(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.by_user.get(user_id).copied()
    }

    pub(crate) fn remove_by_connection(&mut self, connection_id: ConnectionId) -> Option<UserId> {
        let user_id = self.by_connection.remove(&connection_id)?;
        if self.by_user.get(&user_id) == Some(&connection_id) {
            self.by_user.remove(&user_id);
        }
        Some(user_id)
    }

    pub(crate) fn entries(&self) -> Vec<PresenceEntry> {
        self.by_user
            .iter()
            .map(|(user_id, connection_id)| PresenceEntry {
                user_id: user_id.clone(),
                connection_id: *connection_id,
            })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_user.len()
    }
}

/// Live presence registry for the current process
///
/// Constructed once at startup and shared by `Arc`. Every operation takes the same lock, so
/// register, lookup and removal are serializable with respect to one another.
#[derive(Default)]
pub struct PresenceRegistry {
    table: Mutex<PresenceTable>,
}

impl PresenceRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `user_id`
    ///
    /// The replaced connection (if any) is not closed; that is the transport's call.
    pub fn register(&self, user_id: UserId, connection_id: ConnectionId) -> Registration {
        self.table.lock().register(user_id, connection_id)
    }

    /// Get the connection currently registered for `user_id`
    pub fn lookup(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.table.lock().lookup(user_id)
    }

    /// Check if `user_id` has a registered connection
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.lookup(user_id).is_some()
    }

    /// Remove the entry owned by exactly `connection_id`, returning its user
    ///
    /// Unknown or already-overwritten connections are a no-op returning `None`.
    pub fn remove_by_connection(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.table.lock().remove_by_connection(connection_id)
    }

    /// Point-in-time snapshot of all entries, in no particular order
    pub fn list_active(&self) -> Vec<PresenceEntry> {
        self.table.lock().entries()
    }

    /// Number of online users
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Check if nobody is online
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold the registry lock for a compound read-decide-forward step
    pub(crate) fn lock(&self) -> MutexGuard<'_, PresenceTable> {
        self.table.lock()
    }
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("online", &self.len())
            .finish()
    }
}
