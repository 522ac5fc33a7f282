use super::{ConnectionRegistry, RelayRouter, SessionTable, WaitingPool};
use crate::model::{MatchError, RoomId, ServerEvent, UserId};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Where a user currently is in the matchmaking cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Idle,
    Searching,
    Paired(RoomId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched { room: RoomId, partner: UserId },
    Waiting,
    /// The caller was paired concurrently; nothing was changed.
    AlreadyPaired(RoomId),
    NotConnected,
}

/// Pairs users from the waiting pool.
///
/// Lock order is pool, then registry, then session table. The pool lock is
/// held from the pop until the session exists, so no waiter can be handed to
/// two callers.
#[derive(Debug)]
pub struct Matchmaker {
    registry: Arc<ConnectionRegistry>,
    sessions: Arc<SessionTable>,
    router: RelayRouter,
    pool: Mutex<WaitingPool>,
    max_match_attempts: usize,
}

impl Matchmaker {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        sessions: Arc<SessionTable>,
        router: RelayRouter,
        max_match_attempts: usize,
    ) -> Self {
        Matchmaker {
            registry,
            sessions,
            router,
            pool: Mutex::new(WaitingPool::new()),
            max_match_attempts: max_match_attempts.max(1),
        }
    }

    /// Matches the user with the longest waiting valid partner, or enqueues
    /// them. A user who is still paired leaves that session first.
    #[instrument(skip(self))]
    pub fn find_partner(&self, user_id: UserId) -> Result<MatchOutcome, MatchError> {
        if !self.registry.is_connected(user_id)? {
            debug!("Ignoring search from unregistered user");
            return Ok(MatchOutcome::NotConnected);
        }

        if let Some(room) = self.sessions.session_of(user_id)? {
            debug!(%room, "Leaving current session before searching");
            self.router.leave(room, user_id)?;
        }

        let outcome = self.pop_and_match(user_id)?;
        match outcome {
            MatchOutcome::Matched { room, partner } => {
                info!(%room, %partner, "Users matched");
                let found = |initiator| ServerEvent::PartnerFound { room, initiator };
                self.registry.deliver(user_id, found(true))?;
                self.registry.deliver(partner, found(false))?;
            }
            MatchOutcome::Waiting => {
                self.registry.deliver(user_id, ServerEvent::Waiting {})?;
            }
            MatchOutcome::AlreadyPaired(room) => {
                debug!(%room, "User was paired concurrently");
            }
            MatchOutcome::NotConnected => {}
        }
        Ok(outcome)
    }

    fn pop_and_match(&self, user_id: UserId) -> Result<MatchOutcome, MatchError> {
        let mut pool = self.pool.lock().map_err(MatchError::poisoned)?;
        pool.remove(user_id);

        if let Some(room) = self.sessions.session_of(user_id)? {
            return Ok(MatchOutcome::AlreadyPaired(room));
        }

        for attempt in 1..=self.max_match_attempts {
            let Some(candidate) = pool.dequeue_first() else {
                break;
            };
            if self.is_available(candidate)? {
                let session = self.sessions.create(user_id, candidate)?;
                return Ok(MatchOutcome::Matched {
                    room: session.id(),
                    partner: candidate,
                });
            }
            warn!(%candidate, attempt, "Discarding stale waiter");
        }

        pool.enqueue(user_id);
        debug!(waiting = pool.len(), "User is waiting");
        Ok(MatchOutcome::Waiting)
    }

    fn is_available(&self, candidate: UserId) -> Result<bool, MatchError> {
        Ok(self.registry.is_connected(candidate)? && !self.sessions.is_paired(candidate)?)
    }

    /// Stops searching. Only an actual removal is confirmed to the user.
    #[instrument(skip(self))]
    pub fn cancel_search(&self, user_id: UserId) -> Result<bool, MatchError> {
        let removed = self.withdraw(user_id)?;
        if removed {
            debug!("Search stopped");
            self.registry.deliver(user_id, ServerEvent::SearchStopped {})?;
        }
        Ok(removed)
    }

    /// Silently drops the user from the pool.
    pub fn withdraw(&self, user_id: UserId) -> Result<bool, MatchError> {
        let mut pool = self.pool.lock().map_err(MatchError::poisoned)?;
        Ok(pool.remove(user_id))
    }

    pub fn state_of(&self, user_id: UserId) -> Result<MatchState, MatchError> {
        let pool = self.pool.lock().map_err(MatchError::poisoned)?;
        if pool.contains(user_id) {
            return Ok(MatchState::Searching);
        }
        Ok(match self.sessions.session_of(user_id)? {
            Some(room) => MatchState::Paired(room),
            None => MatchState::Idle,
        })
    }

    pub fn waiting_count(&self) -> Result<usize, MatchError> {
        let pool = self.pool.lock().map_err(MatchError::poisoned)?;
        Ok(pool.len())
    }
}
