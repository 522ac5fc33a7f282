use crate::matchmaking::{ConnectionHandle, MatchService};
use crate::model::{ClientEvent, ClientEventHandler, MatchError, UserId};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Binds one WebSocket connection to the shared matchmaking service.
#[derive(Clone, Debug)]
pub struct ConnectionHandler {
    service: MatchService,
    handle: ConnectionHandle,
}

impl ConnectionHandler {
    pub fn new(service: MatchService, handle: ConnectionHandle) -> Self {
        ConnectionHandler { service, handle }
    }

    pub fn user_id(&self) -> UserId {
        self.handle.user_id
    }
}

#[async_trait]
impl ClientEventHandler for ConnectionHandler {
    #[instrument(skip_all, fields(user_id = %self.handle.user_id, event = event.name()))]
    async fn handle_event(&self, event: ClientEvent) -> Result<(), MatchError> {
        debug!("Handling event");
        self.service.dispatch(&self.handle, event)
    }

    #[instrument(skip_all, fields(user_id = %self.handle.user_id))]
    async fn handle_disconnect(&self) -> Result<(), MatchError> {
        self.service.disconnect(&self.handle)?;
        Ok(())
    }
}
