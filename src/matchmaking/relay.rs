use super::{ConnectionRegistry, SessionTable};
use crate::model::{MatchError, RoomId, ServerEvent, UserId};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    UnknownSession,
    /// The sender is not part of the room it addressed.
    NotMember,
    /// The peer is gone or its queue is full.
    PeerDisconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left { peer: UserId, notified: bool },
    /// Already gone, or never joined by this user.
    NoSession,
}

/// Routes session-scoped events to the other participant of a room.
#[derive(Debug, Clone)]
pub struct RelayRouter {
    registry: Arc<ConnectionRegistry>,
    sessions: Arc<SessionTable>,
}

impl RelayRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, sessions: Arc<SessionTable>) -> Self {
        RelayRouter { registry, sessions }
    }

    /// Tears down `room` on behalf of `leaver` and tells the peer.
    #[instrument(skip_all, fields(%room, %leaver))]
    pub fn leave(&self, room: RoomId, leaver: UserId) -> Result<LeaveOutcome, MatchError> {
        let Some(session) = self.sessions.remove(room, leaver)? else {
            debug!("Leave for unknown room ignored");
            return Ok(LeaveOutcome::NoSession);
        };
        let Some(peer) = session.peer_of(leaver) else {
            return Ok(LeaveOutcome::NoSession);
        };

        let notified = self.registry.deliver(peer, ServerEvent::PartnerLeft {})?;
        info!(%peer, notified, "User left session");
        Ok(LeaveOutcome::Left { peer, notified })
    }

    /// Forwards `event` unmodified to the sender's peer in `room`.
    ///
    /// Never echoes to the sender. Unknown rooms, non-members and gone peers
    /// are dropped and reported through the outcome only.
    #[instrument(skip_all, fields(%room, %sender, event = event.name()))]
    pub fn relay(
        &self,
        room: RoomId,
        sender: UserId,
        event: ServerEvent,
    ) -> Result<RelayOutcome, MatchError> {
        let Some(session) = self.sessions.get(room)? else {
            debug!("Dropping event for unknown room");
            return Ok(RelayOutcome::UnknownSession);
        };
        let Some(peer) = session.peer_of(sender) else {
            warn!("Dropping event from non-member");
            return Ok(RelayOutcome::NotMember);
        };

        if self.registry.deliver(peer, event)? {
            debug!(%peer, "Event relayed");
            Ok(RelayOutcome::Delivered)
        } else {
            debug!(%peer, "Peer unreachable, event dropped");
            Ok(RelayOutcome::PeerDisconnected)
        }
    }
}
