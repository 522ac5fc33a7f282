mod connection_handler;
mod match_server;
pub mod route;
pub mod websocket_listener;

pub use connection_handler::ConnectionHandler;
pub use match_server::MatchServer;
pub use route::create_router;
