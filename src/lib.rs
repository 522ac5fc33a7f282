pub mod matchmaking;
pub mod model;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod telemetry;

pub mod prelude {
    pub use crate::matchmaking::ConnectionHandle;
    pub use crate::matchmaking::MatchConfig;
    pub use crate::matchmaking::MatchOutcome;
    pub use crate::matchmaking::MatchService;
    pub use crate::matchmaking::MatchState;
    pub use crate::model::ClientEvent;
    pub use crate::model::ClientEventHandler;
    pub use crate::model::EventError;
    pub use crate::model::MatchError;
    pub use crate::model::RoomId;
    pub use crate::model::ServerEvent;
    pub use crate::model::UserId;
    #[cfg(feature = "server")]
    pub use crate::server::MatchServer;
}
