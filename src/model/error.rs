use super::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Shared state lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("User {0} is already in a session")]
    AlreadyPaired(UserId),

    #[error("User {0} cannot be paired with itself")]
    SelfPairing(UserId),

    #[error("Failed to deliver event to user {0}")]
    Delivery(UserId),
}

impl MatchError {
    pub fn poisoned<T>(e: std::sync::PoisonError<T>) -> Self {
        MatchError::LockPoisoned(e.to_string())
    }
}

/// Reasons an inbound frame is dropped without a reply.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Event {event} is missing field {field}")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },

    #[error("Invalid room: {0}")]
    InvalidRoom(String),
}

impl EventError {
    pub fn missing(event: &'static str, field: &'static str) -> Self {
        EventError::MissingField { event, field }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telemetry initialization failed: {0}")]
    Telemetry(String),
}
