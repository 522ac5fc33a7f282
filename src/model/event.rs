use super::{EventError, RoomId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw inbound frame: `{"event": "...", "data": {...}}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Events a client may send once connected.
///
/// `connect` and `disconnect` are transport lifecycle, not frames, so they
/// have no variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    FindPartner,
    StopSearch,
    LeaveChat { room: RoomId },
    /// `payload` is the whole inbound `data` object, forwarded untouched.
    Signal { room: RoomId, payload: Value },
    ChatMessage { room: RoomId, message: String },
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, EventError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::from_parts(&envelope.event, envelope.data)
    }

    pub fn from_parts(event: &str, data: Value) -> Result<Self, EventError> {
        match event {
            "find_partner" => Ok(ClientEvent::FindPartner),
            "stop_search" => Ok(ClientEvent::StopSearch),
            "leave_chat" => Ok(ClientEvent::LeaveChat {
                room: room_of("leave_chat", &data)?,
            }),
            "signal" => Ok(ClientEvent::Signal {
                room: room_of("signal", &data)?,
                payload: data,
            }),
            "chat_message" => {
                let room = room_of("chat_message", &data)?;
                match data.get("message") {
                    Some(Value::String(message)) if !message.is_empty() => {
                        Ok(ClientEvent::ChatMessage {
                            room,
                            message: message.clone(),
                        })
                    }
                    _ => Err(EventError::missing("chat_message", "message")),
                }
            }
            other => Err(EventError::UnknownEvent(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::FindPartner => "find_partner",
            ClientEvent::StopSearch => "stop_search",
            ClientEvent::LeaveChat { .. } => "leave_chat",
            ClientEvent::Signal { .. } => "signal",
            ClientEvent::ChatMessage { .. } => "chat_message",
        }
    }
}

fn room_of(event: &'static str, data: &Value) -> Result<RoomId, EventError> {
    match data.get("room") {
        Some(Value::String(room)) if !room.is_empty() => room
            .parse()
            .map_err(|_| EventError::InvalidRoom(room.clone())),
        _ => Err(EventError::missing(event, "room")),
    }
}

/// Events pushed from the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// First frame on every connection; tells the client which identity to
    /// present when it reconnects.
    Connected { user_id: UserId },
    UserCount { count: usize },
    Waiting {},
    PartnerFound { room: RoomId, initiator: bool },
    SearchStopped {},
    PartnerLeft {},
    Signal(Value),
    ChatMessage { message: String },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::UserCount { .. } => "user_count",
            ServerEvent::Waiting {} => "waiting",
            ServerEvent::PartnerFound { .. } => "partner_found",
            ServerEvent::SearchStopped {} => "search_stopped",
            ServerEvent::PartnerLeft {} => "partner_left",
            ServerEvent::Signal(_) => "signal",
            ServerEvent::ChatMessage { .. } => "chat_message",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROOM: &str = "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8";

    #[test]
    fn test_parse_events_without_data() {
        assert_eq!(
            ClientEvent::parse(r#"{"event":"find_partner"}"#).unwrap(),
            ClientEvent::FindPartner
        );
        assert_eq!(
            ClientEvent::parse(r#"{"event":"stop_search","data":{}}"#).unwrap(),
            ClientEvent::StopSearch
        );
    }

    #[test]
    fn test_parse_chat_message() {
        let text = json!({"event": "chat_message", "data": {"room": ROOM, "message": "hi"}});
        let event = ClientEvent::parse(&text.to_string()).unwrap();
        assert_eq!(
            event,
            ClientEvent::ChatMessage {
                room: ROOM.parse().unwrap(),
                message: "hi".to_string(),
            }
        );
    }

    #[test]
    fn test_signal_keeps_whole_payload() {
        let data = json!({"room": ROOM, "type": "offer", "sdp": "v=0"});
        let event = ClientEvent::from_parts("signal", data.clone()).unwrap();
        match event {
            ClientEvent::Signal { room, payload } => {
                assert_eq!(room, ROOM.parse().unwrap());
                assert_eq!(payload, data);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_missing_room_is_rejected() {
        let result = ClientEvent::parse(r#"{"event":"leave_chat","data":{}}"#);
        assert!(matches!(
            result,
            Err(EventError::MissingField {
                event: "leave_chat",
                field: "room"
            })
        ));

        let result = ClientEvent::parse(r#"{"event":"signal"}"#);
        assert!(matches!(result, Err(EventError::MissingField { .. })));
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let text = json!({"event": "chat_message", "data": {"room": ROOM, "message": ""}});
        let result = ClientEvent::parse(&text.to_string());
        assert!(matches!(
            result,
            Err(EventError::MissingField {
                field: "message",
                ..
            })
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            ClientEvent::parse("not json"),
            Err(EventError::InvalidJson(_))
        ));
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"dance"}"#),
            Err(EventError::UnknownEvent(_))
        ));
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"leave_chat","data":{"room":"lobby-1"}}"#),
            Err(EventError::InvalidRoom(_))
        ));
    }

    #[test]
    fn test_serialize_server_events() {
        let room: RoomId = ROOM.parse().unwrap();
        let serialized = serde_json::to_string(&ServerEvent::PartnerFound {
            room,
            initiator: true,
        })
        .unwrap();
        assert_eq!(
            serialized,
            format!(
                r#"{{"event":"partner_found","data":{{"room":"{}","initiator":true}}}}"#,
                ROOM
            )
        );

        let serialized = serde_json::to_string(&ServerEvent::Waiting {}).unwrap();
        assert_eq!(serialized, r#"{"event":"waiting","data":{}}"#);

        let serialized = serde_json::to_string(&ServerEvent::UserCount { count: 3 }).unwrap();
        assert_eq!(serialized, r#"{"event":"user_count","data":{"count":3}}"#);
    }

    #[test]
    fn test_forwarded_signal_is_unchanged() {
        let payload = json!({"room": ROOM, "candidate": {"sdpMid": "0"}});
        let serialized = serde_json::to_value(ServerEvent::Signal(payload.clone())).unwrap();
        assert_eq!(serialized, json!({"event": "signal", "data": payload}));
    }
}
