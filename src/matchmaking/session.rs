use crate::model::{MatchError, RoomId, UserId};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, instrument};

/// A live pairing of exactly two users.
///
/// Holds identities only; connection lifetime belongs to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: RoomId,
    /// `participants[0]` is the initiator.
    participants: [UserId; 2],
}

impl Session {
    fn new(id: RoomId, initiator: UserId, responder: UserId) -> Self {
        Session {
            id,
            participants: [initiator, responder],
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn participants(&self) -> [UserId; 2] {
        self.participants
    }

    /// The participant told to start the downstream negotiation.
    pub fn initiator(&self) -> UserId {
        self.participants[0]
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }

    /// The other participant, or `None` if `user_id` is not a member.
    pub fn peer_of(&self, user_id: UserId) -> Option<UserId> {
        match self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Sessions {
    rooms: HashMap<RoomId, Session>,
    users_to_rooms: HashMap<UserId, RoomId>,
}

/// Table of live sessions, indexed by room and by participant.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: RwLock<Sessions>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `initiator` with `responder` under a fresh room id.
    #[instrument(skip(self))]
    pub fn create(&self, initiator: UserId, responder: UserId) -> Result<Session, MatchError> {
        if initiator == responder {
            return Err(MatchError::SelfPairing(initiator));
        }

        let mut sessions = self.sessions.write().map_err(MatchError::poisoned)?;
        for user_id in [initiator, responder] {
            if sessions.users_to_rooms.contains_key(&user_id) {
                return Err(MatchError::AlreadyPaired(user_id));
            }
        }

        let mut id = RoomId::new();
        while sessions.rooms.contains_key(&id) {
            id = RoomId::new();
        }

        let session = Session::new(id, initiator, responder);
        sessions.rooms.insert(id, session.clone());
        sessions.users_to_rooms.insert(initiator, id);
        sessions.users_to_rooms.insert(responder, id);
        debug!(room = %id, "Session created");
        Ok(session)
    }

    pub fn get(&self, room: RoomId) -> Result<Option<Session>, MatchError> {
        let sessions = self.sessions.read().map_err(MatchError::poisoned)?;
        Ok(sessions.rooms.get(&room).cloned())
    }

    pub fn session_of(&self, user_id: UserId) -> Result<Option<RoomId>, MatchError> {
        let sessions = self.sessions.read().map_err(MatchError::poisoned)?;
        Ok(sessions.users_to_rooms.get(&user_id).copied())
    }

    pub fn is_paired(&self, user_id: UserId) -> Result<bool, MatchError> {
        Ok(self.session_of(user_id)?.is_some())
    }

    /// Destroys the session if it exists and `leaver` belongs to it.
    ///
    /// Returns the removed session; a second call for the same room returns
    /// `None`. Other sessions are never touched.
    #[instrument(skip(self))]
    pub fn remove(&self, room: RoomId, leaver: UserId) -> Result<Option<Session>, MatchError> {
        let mut sessions = self.sessions.write().map_err(MatchError::poisoned)?;
        let is_member = sessions
            .rooms
            .get(&room)
            .map(|session| session.contains(leaver))
            .unwrap_or(false);
        if !is_member {
            debug!("No live session with this member");
            return Ok(None);
        }

        let removed = sessions.rooms.remove(&room);
        if let Some(session) = &removed {
            for user_id in session.participants() {
                sessions.users_to_rooms.remove(&user_id);
            }
            debug!("Session removed");
        }
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize, MatchError> {
        let sessions = self.sessions.read().map_err(MatchError::poisoned)?;
        Ok(sessions.rooms.len())
    }

    pub fn is_empty(&self) -> Result<bool, MatchError> {
        Ok(self.len()? == 0)
    }
}
