//! Presence tracking, the waiting pool and the sessions formed from it.

mod connection;
mod matchmaker;
mod pool;
mod registry;
mod relay;
mod service;
mod session;

pub use connection::ConnectionHandle;
pub use matchmaker::{MatchOutcome, MatchState, Matchmaker};
pub use pool::WaitingPool;
pub use registry::ConnectionRegistry;
pub use relay::{LeaveOutcome, RelayOutcome, RelayRouter};
pub use service::{MatchConfig, MatchService, ServiceStats};
pub use session::{Session, SessionTable};
