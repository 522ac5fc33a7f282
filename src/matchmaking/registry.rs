use super::ConnectionHandle;
use crate::model::{MatchError, ServerEvent, UserId};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Sole owner of the identity -> live handle mapping.
///
/// Every mutation that changes who is online is followed by a `user_count`
/// broadcast, sent after the lock has been released.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Records `handle` as the live endpoint of its user, returning the
    /// handle it replaced.
    #[instrument(skip(self, handle), fields(user_id = %handle.user_id))]
    pub fn register(
        &self,
        handle: ConnectionHandle,
    ) -> Result<Option<ConnectionHandle>, MatchError> {
        let (replaced, count) = {
            let mut connections = self.connections.write().map_err(MatchError::poisoned)?;
            let replaced = connections.insert(handle.user_id, handle);
            (replaced, connections.len())
        };
        if replaced.is_some() {
            debug!("Replaced existing connection");
        }
        debug!(count, "Connection registered");
        self.broadcast(ServerEvent::UserCount { count })?;
        Ok(replaced)
    }

    /// Forgets the user's handle. Absent users are a no-op.
    #[instrument(skip(self))]
    pub fn unregister(&self, user_id: UserId) -> Result<Option<ConnectionHandle>, MatchError> {
        let (removed, count) = {
            let mut connections = self.connections.write().map_err(MatchError::poisoned)?;
            let removed = connections.remove(&user_id);
            (removed, connections.len())
        };
        if removed.is_some() {
            debug!(count, "Connection unregistered");
            self.broadcast(ServerEvent::UserCount { count })?;
        }
        Ok(removed)
    }

    /// Unregisters the handle's user only while `handle` is still the current
    /// one. Returns `false` when a newer connection owns the identity.
    #[instrument(skip(self, handle), fields(user_id = %handle.user_id))]
    pub fn release(&self, handle: &ConnectionHandle) -> Result<bool, MatchError> {
        let count = {
            let mut connections = self.connections.write().map_err(MatchError::poisoned)?;
            match connections.get(&handle.user_id) {
                Some(current) if current == handle => {
                    connections.remove(&handle.user_id);
                    connections.len()
                }
                _ => {
                    debug!("Handle already replaced or removed");
                    return Ok(false);
                }
            }
        };
        debug!(count, "Connection released");
        self.broadcast(ServerEvent::UserCount { count })?;
        Ok(true)
    }

    pub fn lookup(&self, user_id: UserId) -> Result<Option<ConnectionHandle>, MatchError> {
        let connections = self.connections.read().map_err(MatchError::poisoned)?;
        Ok(connections.get(&user_id).cloned())
    }

    /// Registered and with a transport that is still open.
    pub fn is_connected(&self, user_id: UserId) -> Result<bool, MatchError> {
        let connections = self.connections.read().map_err(MatchError::poisoned)?;
        Ok(connections
            .get(&user_id)
            .map(|handle| !handle.is_closed())
            .unwrap_or(false))
    }

    pub fn is_current(&self, handle: &ConnectionHandle) -> Result<bool, MatchError> {
        let connections = self.connections.read().map_err(MatchError::poisoned)?;
        Ok(connections.get(&handle.user_id) == Some(handle))
    }

    pub fn count(&self) -> Result<usize, MatchError> {
        let connections = self.connections.read().map_err(MatchError::poisoned)?;
        Ok(connections.len())
    }

    /// Queues a directed event on the user's current connection without
    /// waiting. A full or closed queue drops the event, so a client that
    /// stops reading never stalls the sender.
    /// Returns `false` when the event was not queued.
    pub fn deliver(&self, user_id: UserId, event: ServerEvent) -> Result<bool, MatchError> {
        let Some(handle) = self.lookup(user_id)? else {
            debug!(%user_id, event = event.name(), "Recipient not connected");
            return Ok(false);
        };
        let name = event.name();
        match handle.try_deliver(event) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(%user_id, error = %e, event = name, "Dropped directed event");
                Ok(false)
            }
        }
    }

    /// Non-blocking fan-out to every connection; returns how many accepted it.
    pub fn broadcast(&self, event: ServerEvent) -> Result<usize, MatchError> {
        let handles: Vec<ConnectionHandle> = {
            let connections = self.connections.read().map_err(MatchError::poisoned)?;
            connections.values().cloned().collect()
        };

        let mut delivered = 0;
        for handle in handles {
            match handle.try_deliver(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(user_id = %handle.user_id, error = %e, event = event.name(), "Dropped broadcast"),
            }
        }
        Ok(delivered)
    }
}
