use crate::model::{MatchError, ServerEvent, UserId};
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

/// Live transport endpoint of a user.
///
/// `connection_id` distinguishes two handles of the same identity, so a
/// replaced handle can be told apart from the current one.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub user_id: UserId,
    pub connection_id: Uuid,
    pub sender: Sender<ServerEvent>,
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.connection_id == other.connection_id
    }
}

impl ConnectionHandle {
    pub fn new(user_id: UserId, sender: Sender<ServerEvent>) -> Self {
        ConnectionHandle {
            user_id,
            connection_id: Uuid::new_v4(),
            sender,
        }
    }

    /// Queues an event without waiting; a full or closed queue drops it.
    pub fn try_deliver(&self, event: ServerEvent) -> Result<(), MatchError> {
        self.sender
            .try_send(event)
            .map_err(|_| MatchError::Delivery(self.user_id))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
