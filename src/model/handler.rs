use super::{ClientEvent, MatchError};
use async_trait::async_trait;

/// Per-connection entry point for inbound events.
#[async_trait]
pub trait ClientEventHandler {
    async fn handle_event(&self, event: ClientEvent) -> Result<(), MatchError>;

    /// Called once when the transport closes.
    async fn handle_disconnect(&self) -> Result<(), MatchError>;
}
