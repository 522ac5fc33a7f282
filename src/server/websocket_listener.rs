use crate::matchmaking::MatchService;
use crate::model::{ClientEvent, ClientEventHandler, ServerEvent, UserId};
use crate::server::ConnectionHandler;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::WebSocketUpgrade;
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info, instrument, warn};

#[instrument(skip(ws, service))]
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    service: MatchService,
    user_id: Option<UserId>,
) -> impl IntoResponse {
    debug!("New WebSocket upgrade request");
    ws.on_upgrade(move |socket| listen(socket, service, user_id))
}

async fn listen(socket: WebSocket, service: MatchService, user_id: Option<UserId>) {
    let (handle, rx) = match service.connect(user_id) {
        Ok(connection) => connection,
        Err(e) => {
            error!(error = %e, "Failed to register connection");
            return;
        }
    };
    let connection_handler = ConnectionHandler::new(service, handle);
    let (ws_sender, ws_receiver) = socket.split();

    let sender_task = handle_outgoing_messages(rx, ws_sender);
    let receiver_task = handle_incoming_messages(ws_receiver, &connection_handler);

    tokio::select! {
        _ = sender_task => {
            info!(user_id = %connection_handler.user_id(), "Sender task completed");
        }
        _ = receiver_task => {
            info!(user_id = %connection_handler.user_id(), "Receiver task completed");
        }
    }
    if let Err(e) = connection_handler.handle_disconnect().await {
        error!(error = %e, "Failed to disconnect");
    }
}

#[instrument(skip(rx, ws_sender))]
pub async fn handle_outgoing_messages(
    mut rx: Receiver<ServerEvent>,
    mut ws_sender: SplitSink<WebSocket, Message>,
) {
    while let Some(event) = rx.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, event = event.name(), "Failed to serialize event");
                continue;
            }
        };
        if let Err(e) = ws_sender.send(Message::Text(text)).await {
            error!(error = %e, "Failed to send message");
            break;
        }
    }
}

#[instrument(skip_all, fields(user_id = %connection_handler.user_id()))]
pub async fn handle_incoming_messages(
    mut receiver: SplitStream<WebSocket>,
    connection_handler: &ConnectionHandler,
) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(message) => {
                if !handle_message(message, connection_handler).await {
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to receive message");
                break;
            }
        }
    }
}

/// Handles one frame; returns `false` once the client has closed.
pub async fn handle_message(message: Message, connection_handler: &ConnectionHandler) -> bool {
    match message {
        Message::Text(text) => match ClientEvent::parse(&text) {
            Ok(event) => {
                if let Err(e) = connection_handler.handle_event(event).await {
                    error!(error = %e, "Failed to handle event");
                }
            }
            Err(e) => {
                debug!(error = %e, "Dropping malformed frame");
            }
        },
        Message::Close(_) => {
            info!(user_id = %connection_handler.user_id(), "Client closed connection");
            return false;
        }
        Message::Ping(_) | Message::Pong(_) => {}
        Message::Binary(_) => {
            warn!(
                user_id = %connection_handler.user_id(),
                "Unsupported binary message"
            );
        }
    }
    true
}
