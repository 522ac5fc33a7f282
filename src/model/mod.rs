mod error;
mod event;
mod handler;
mod identity;

pub use error::{EventError, MatchError, ServerError};
pub use event::{ClientEvent, ServerEvent};
pub use handler::ClientEventHandler;
pub use identity::{RoomId, UserId};
