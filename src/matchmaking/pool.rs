use crate::model::UserId;
use std::collections::VecDeque;

/// FIFO of users looking for a partner. An identity appears at most once.
///
/// Not synchronised on its own: the matchmaker keeps it behind the lock that
/// also covers pop-and-match.
#[derive(Debug, Default)]
pub struct WaitingPool {
    queue: VecDeque<UserId>,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the user unless already waiting. Returns whether it was added.
    pub fn enqueue(&mut self, user_id: UserId) -> bool {
        if self.contains(user_id) {
            return false;
        }
        self.queue.push_back(user_id);
        true
    }

    pub fn dequeue_first(&mut self) -> Option<UserId> {
        self.queue.pop_front()
    }

    /// Returns whether the user was waiting.
    pub fn remove(&mut self, user_id: UserId) -> bool {
        match self.queue.iter().position(|&id| id == user_id) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.queue.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
