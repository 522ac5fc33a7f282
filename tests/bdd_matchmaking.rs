use cucumber::{given, then, when, World};
use konnekt_match::matchmaking::{ConnectionHandle, MatchConfig, MatchService, MatchState};
use konnekt_match::model::{ClientEvent, RoomId, ServerEvent};
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc::Receiver;

#[derive(Debug)]
struct Client {
    handle: ConnectionHandle,
    events: Receiver<ServerEvent>,
    /// Received but not yet asserted on, presence updates excluded.
    pending: VecDeque<ServerEvent>,
    room: Option<(RoomId, bool)>,
}

#[derive(Debug, World)]
pub struct MatchWorld {
    service: MatchService,
    clients: HashMap<String, Client>,
}

impl Default for MatchWorld {
    fn default() -> Self {
        MatchWorld {
            service: MatchService::new(MatchConfig {
                channel_capacity: 256,
                ..MatchConfig::default()
            }),
            clients: HashMap::new(),
        }
    }
}

impl MatchWorld {
    fn connect(&mut self, name: &str) {
        let (handle, events) = self.service.connect(None).unwrap();
        self.clients.insert(
            name.to_string(),
            Client {
                handle,
                events,
                pending: VecDeque::new(),
                room: None,
            },
        );
    }

    fn client(&mut self, name: &str) -> &mut Client {
        self.clients
            .get_mut(name)
            .unwrap_or_else(|| panic!("User '{}' not connected", name))
    }

    fn handle(&mut self, name: &str) -> ConnectionHandle {
        self.client(name).handle.clone()
    }

    /// Moves everything delivered so far into the pending queue.
    fn pull(&mut self, name: &str) -> &mut Client {
        let client = self.client(name);
        while let Ok(event) = client.events.try_recv() {
            match event {
                ServerEvent::UserCount { .. } | ServerEvent::Connected { .. } => {}
                ServerEvent::PartnerFound { room, initiator } => {
                    client.room = Some((room, initiator));
                    client.pending.push_back(event);
                }
                ServerEvent::PartnerLeft {} => {
                    client.room = None;
                    client.pending.push_back(event);
                }
                other => client.pending.push_back(other),
            }
        }
        client
    }

    fn room(&mut self, name: &str) -> RoomId {
        self.pull(name)
            .room
            .map(|(room, _)| room)
            .unwrap_or_else(|| panic!("User '{}' is not in a room", name))
    }

    fn dispatch(&mut self, name: &str, event: ClientEvent) {
        let handle = self.handle(name);
        self.service.dispatch(&handle, event).unwrap();
    }
}

#[given(expr = "{string} is connected")]
async fn user_is_connected(world: &mut MatchWorld, name: String) {
    world.connect(&name);
}

#[given(expr = "{string} and {string} are chatting")]
async fn users_are_chatting(world: &mut MatchWorld, first: String, second: String) {
    world.connect(&first);
    world.connect(&second);
    world.dispatch(&first, ClientEvent::FindPartner);
    world.dispatch(&second, ClientEvent::FindPartner);

    assert_eq!(world.room(&first), world.room(&second));
    world.pull(&first).pending.clear();
    world.pull(&second).pending.clear();
}

#[when(expr = "{string} searches for a partner")]
async fn user_searches(world: &mut MatchWorld, name: String) {
    world.dispatch(&name, ClientEvent::FindPartner);
}

#[when(expr = "{string} stops searching")]
async fn user_stops_searching(world: &mut MatchWorld, name: String) {
    world.dispatch(&name, ClientEvent::StopSearch);
}

#[when(expr = "{string} sends the message {string}")]
async fn user_sends_message(world: &mut MatchWorld, name: String, message: String) {
    let room = world.room(&name);
    world.dispatch(&name, ClientEvent::ChatMessage { room, message });
}

#[when(expr = "{string} leaves the chat")]
async fn user_leaves(world: &mut MatchWorld, name: String) {
    let room = world.room(&name);
    world.dispatch(&name, ClientEvent::LeaveChat { room });
}

#[when(expr = "{string} disconnects")]
async fn user_disconnects(world: &mut MatchWorld, name: String) {
    let handle = world.handle(&name);
    assert!(world.service.disconnect(&handle).unwrap());
}

#[then(expr = "{string} receives {string}")]
async fn user_receives(world: &mut MatchWorld, name: String, event: String) {
    let received = world
        .pull(&name)
        .pending
        .pop_front().unwrap_or_else(|| panic!("'{}' received nothing", name));
    assert_eq!(received.name(), event);
}

#[then(expr = "{string} receives the message {string}")]
async fn user_receives_message(world: &mut MatchWorld, name: String, message: String) {
    let received = world.pull(&name).pending.pop_front();
    assert_eq!(received, Some(ServerEvent::ChatMessage { message }));
}

#[then(expr = "{string} receives nothing")]
async fn user_receives_nothing(world: &mut MatchWorld, name: String) {
    let pending = &world.pull(&name).pending;
    assert!(pending.is_empty(), "unexpected events: {:?}", pending);
}

#[then(expr = "{string} and {string} share a room")]
async fn users_share_room(world: &mut MatchWorld, first: String, second: String) {
    assert_eq!(world.room(&first), world.room(&second));
}

#[then(expr = "{string} is the initiator")]
async fn user_is_initiator(world: &mut MatchWorld, name: String) {
    let initiator = world.pull(&name).room.map(|(_, initiator)| initiator);
    assert_eq!(initiator, Some(true));
}

#[then(expr = "{string} is idle")]
async fn user_is_idle(world: &mut MatchWorld, name: String) {
    let user_id = world.handle(&name).user_id;
    let state = world.service.matchmaker().state_of(user_id).unwrap();
    assert_eq!(state, MatchState::Idle);
}

#[tokio::main]
async fn main() {
    MatchWorld::cucumber()
        .max_concurrent_scenarios(1)
        .run_and_exit("tests/features")
        .await;
}
