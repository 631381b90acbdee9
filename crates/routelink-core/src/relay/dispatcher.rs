//! Relay dispatcher
//!
//! Applies one [`RelayCommand`] from one connection:
//! - `Join` registers the connection for a user
//! - `SendMessage` / `RequestUpdate` look the receiver up and forward at most once
//! - `Disconnect` removes whatever the connection had registered
//!
//! The decision for a command is a plain function of (registry state, command). The lookup and
//! the forward run under the registry lock so a concurrent disconnect or re-join cannot slip
//! between them.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::events::{OutboundEvent, ReceiveMessageEvent, RelayCommand, RequestStatusChangedEvent};
use crate::presence::{PresenceRegistry, PresenceTable, Registration};
use crate::traits::{Outbound, OutboundError};
use crate::value_objects::{ConnectionId, UserId};

/// An event bound for one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    pub target: UserId,
    pub connection_id: ConnectionId,
    pub event: OutboundEvent,
}

/// Why a forwarding command produced no delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Receiver has no registered connection
    Offline,
    /// Receiver was registered but the transport refused the event
    Undeliverable(OutboundError),
}

/// Result of dispatching one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Joined {
        user_id: UserId,
        registration: Registration,
    },
    Forwarded {
        target: UserId,
        connection_id: ConnectionId,
    },
    Dropped {
        target: UserId,
        reason: DropReason,
    },
    Disconnected {
        user_id: Option<UserId>,
    },
}

/// What the registry state says to do with a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decision {
    Joined {
        user_id: UserId,
        registration: Registration,
    },
    Forward(Forward),
    Drop {
        target: UserId,
    },
    Disconnected {
        user_id: Option<UserId>,
    },
}

/// Decide the effect of `command` arriving on `connection_id`, mutating `table` as needed
pub(crate) fn decide(
    table: &mut PresenceTable,
    connection_id: ConnectionId,
    command: RelayCommand,
    now: DateTime<Utc>,
) -> Decision {
    match command {
        RelayCommand::Join { user_id } => {
            let registration = table.register(user_id.clone(), connection_id);
            Decision::Joined {
                user_id,
                registration,
            }
        }
        RelayCommand::SendMessage(message) => {
            let target = message.receiver_id.clone();
            match table.lookup(&target) {
                Some(receiver) => Decision::Forward(Forward {
                    target,
                    connection_id: receiver,
                    event: OutboundEvent::ReceiveMessage(ReceiveMessageEvent::from_message(
                        message, now,
                    )),
                }),
                None => Decision::Drop { target },
            }
        }
        RelayCommand::RequestUpdate(update) => {
            let target = update.receiver_id.clone();
            match table.lookup(&target) {
                Some(receiver) => Decision::Forward(Forward {
                    target,
                    connection_id: receiver,
                    event: OutboundEvent::RequestStatusChanged(RequestStatusChangedEvent::from(
                        update,
                    )),
                }),
                None => Decision::Drop { target },
            }
        }
        RelayCommand::Disconnect => Decision::Disconnected {
            user_id: table.remove_by_connection(connection_id),
        },
    }
}

/// Routes relay commands through the presence registry to the transport
pub struct RelayDispatcher {
    registry: Arc<PresenceRegistry>,
    outbound: Arc<dyn Outbound>,
    clock: fn() -> DateTime<Utc>,
}

impl RelayDispatcher {
    /// Create a dispatcher over a registry and a transport
    pub fn new(registry: Arc<PresenceRegistry>, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            registry,
            outbound,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for server timestamps
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the presence registry
    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    /// Apply `command` received on `connection_id`
    ///
    /// Never fails: an offline receiver or a refused forward is reported in the outcome and
    /// otherwise forgotten.
    pub fn dispatch(&self, connection_id: ConnectionId, command: RelayCommand) -> RelayOutcome {
        if let RelayCommand::SendMessage(message) = &command {
            if !message
                .conversation_id
                .is_between(&message.sender_id, &message.receiver_id)
            {
                tracing::debug!(
                    connection_id = %connection_id,
                    chat_id = %message.conversation_id,
                    sender_id = %message.sender_id,
                    receiver_id = %message.receiver_id,
                    "chatId does not match participants, forwarding as-is"
                );
            }
        }

        let mut table = self.registry.lock();
        let decision = decide(&mut table, connection_id, command, (self.clock)());

        match decision {
            Decision::Joined {
                user_id,
                registration,
            } => {
                drop(table);
                tracing::info!(
                    connection_id = %connection_id,
                    user_id = %user_id,
                    replaced = ?registration.replaced,
                    unbound = ?registration.unbound,
                    "User joined"
                );
                RelayOutcome::Joined {
                    user_id,
                    registration,
                }
            }
            Decision::Forward(forward) => {
                let result = self.outbound.forward(forward.connection_id, &forward.event);
                drop(table);
                match result {
                    Ok(()) => {
                        tracing::debug!(
                            event = forward.event.name(),
                            target = %forward.target,
                            connection_id = %forward.connection_id,
                            "Event forwarded"
                        );
                        RelayOutcome::Forwarded {
                            target: forward.target,
                            connection_id: forward.connection_id,
                        }
                    }
                    Err(e) => {
                        tracing::debug!(
                            event = forward.event.name(),
                            target = %forward.target,
                            connection_id = %forward.connection_id,
                            error = %e,
                            "Forward failed, dropping event"
                        );
                        RelayOutcome::Dropped {
                            target: forward.target,
                            reason: DropReason::Undeliverable(e),
                        }
                    }
                }
            }
            Decision::Drop { target } => {
                drop(table);
                tracing::debug!(target = %target, "Receiver not connected, dropping event");
                RelayOutcome::Dropped {
                    target,
                    reason: DropReason::Offline,
                }
            }
            Decision::Disconnected { user_id } => {
                drop(table);
                if let Some(user_id) = &user_id {
                    tracing::info!(
                        connection_id = %connection_id,
                        user_id = %user_id,
                        "User disconnected"
                    );
                }
                RelayOutcome::Disconnected { user_id }
            }
        }
    }
}

impl std::fmt::Debug for RelayDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayDispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}
