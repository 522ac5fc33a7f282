use super::{
    ConnectionHandle, ConnectionRegistry, Matchmaker, RelayRouter, SessionTable,
};
use crate::model::{ClientEvent, MatchError, ServerEvent, UserId};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    /// Outbound queue size per connection, at least 1.
    pub channel_capacity: usize,
    /// Pool entries examined per search before the caller is enqueued.
    pub max_match_attempts: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            max_match_attempts: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub users: usize,
    pub waiting: usize,
    pub sessions: usize,
}

/// The matchmaking service shared by every connection handler.
///
/// Cheap to clone; all clones operate on the same registry, pool and
/// session table.
#[derive(Debug, Clone)]
pub struct MatchService {
    channel_capacity: usize,
    registry: Arc<ConnectionRegistry>,
    sessions: Arc<SessionTable>,
    router: RelayRouter,
    matchmaker: Arc<Matchmaker>,
}

impl MatchService {
    pub fn new(config: MatchConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let sessions = Arc::new(SessionTable::new());
        let router = RelayRouter::new(registry.clone(), sessions.clone());
        let matchmaker = Arc::new(Matchmaker::new(
            registry.clone(),
            sessions.clone(),
            router.clone(),
            config.max_match_attempts,
        ));
        MatchService {
            channel_capacity: config.channel_capacity.max(1),
            registry,
            sessions,
            router,
            matchmaker,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn matchmaker(&self) -> &Matchmaker {
        &self.matchmaker
    }

    pub fn router(&self) -> &RelayRouter {
        &self.router
    }

    /// Registers a new connection, reusing `user_id` when the client presents
    /// one. The returned receiver yields everything addressed to the client,
    /// starting with `connected`.
    #[instrument(skip(self))]
    pub fn connect(
        &self,
        user_id: Option<UserId>,
    ) -> Result<(ConnectionHandle, Receiver<ServerEvent>), MatchError> {
        let user_id = user_id.unwrap_or_default();
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let handle = ConnectionHandle::new(user_id, tx);

        handle.try_deliver(ServerEvent::Connected { user_id })?;
        if self.registry.register(handle.clone())?.is_some() {
            info!(%user_id, "User reconnected, previous connection superseded");
        } else {
            info!(%user_id, "User connected");
        }
        Ok((handle, rx))
    }

    /// Removes the user from the pool and any session, then forgets the
    /// handle. A handle superseded by a reconnect changes nothing.
    #[instrument(skip_all, fields(user_id = %handle.user_id))]
    pub fn disconnect(&self, handle: &ConnectionHandle) -> Result<bool, MatchError> {
        if !self.registry.is_current(handle)? {
            debug!("Superseded connection closed");
            return Ok(false);
        }

        let user_id = handle.user_id;
        if self.matchmaker.withdraw(user_id)? {
            debug!("Removed from waiting pool");
        }
        if let Some(room) = self.sessions.session_of(user_id)? {
            self.router.leave(room, user_id)?;
        }
        let released = self.registry.release(handle)?;
        info!("User disconnected");
        Ok(released)
    }

    /// Routes one inbound event from `handle`'s client.
    #[instrument(skip_all, fields(user_id = %handle.user_id, event = event.name()))]
    pub fn dispatch(&self, handle: &ConnectionHandle, event: ClientEvent) -> Result<(), MatchError> {
        if !self.registry.is_current(handle)? {
            debug!("Ignoring event from superseded connection");
            return Ok(());
        }

        let user_id = handle.user_id;
        match event {
            ClientEvent::FindPartner => {
                self.matchmaker.find_partner(user_id)?;
            }
            ClientEvent::StopSearch => {
                self.matchmaker.cancel_search(user_id)?;
            }
            ClientEvent::LeaveChat { room } => {
                self.router.leave(room, user_id)?;
            }
            ClientEvent::Signal { room, payload } => {
                self.router.relay(room, user_id, ServerEvent::Signal(payload))?;
            }
            ClientEvent::ChatMessage { room, message } => {
                self.router.relay(room, user_id, ServerEvent::ChatMessage { message })?;
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> Result<ServiceStats, MatchError> {
        Ok(ServiceStats {
            users: self.registry.count()?,
            waiting: self.matchmaker.waiting_count()?,
            sessions: self.sessions.len()?,
        })
    }
}

impl Default for MatchService {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}
