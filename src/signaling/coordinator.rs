use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};

use super::messages::ServerMessage;
use super::registry::Registry;
use super::types::{CallSummary, PeerId, Role, RoomName};

pub const ROOM_CAPACITY: usize = 2;

/// An outbound message addressed to one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub target: PeerId,
    pub message: ServerMessage,
}

/// Everything an operation wants the outside world to see.
#[derive(Debug, Default)]
pub struct Effects {
    pub directives: Vec<Directive>,
    pub ended_calls: Vec<CallSummary>,
}

impl Effects {
    fn push(&mut self, target: PeerId, message: ServerMessage) {
        self.directives.push(Directive { target, message });
    }

    fn extend(&mut self, other: Effects) {
        self.directives.extend(other.directives);
        self.ended_calls.extend(other.ended_calls);
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.ended_calls.is_empty()
    }
}

struct Member {
    id: PeerId,
    user_data: Value,
}

/// Members in join order: slot 0 becomes the caller, slot 1 the acceptor.
struct Room {
    members: Vec<Member>,
    call_started: Option<Instant>,
}

impl Room {
    fn new() -> Self {
        Self {
            members: Vec::with_capacity(ROOM_CAPACITY),
            call_started: None,
        }
    }

    fn position(&self, id: &PeerId) -> Option<usize> {
        self.members.iter().position(|m| m.id == *id)
    }

    fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }
}

/// Owns the room table and the participant registry.
///
/// Operations never fail; they return the [`Effects`] the caller must
/// dispatch. Callers are responsible for serializing access.
pub struct Coordinator<H> {
    registry: Registry<H>,
    rooms: HashMap<RoomName, Room>,
}

impl<H> Default for Coordinator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Coordinator<H> {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            rooms: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry<H> {
        &self.registry
    }

    pub fn register(&mut self, id: PeerId, handle: H) {
        self.registry.register(id, handle);
    }

    pub fn join_room(&mut self, peer_id: PeerId, room_name: RoomName, user_data: Value) -> Effects {
        let mut effects = Effects::default();

        if !self.registry.contains(&peer_id) {
            debug!("Ignoring join of {} from unregistered peer {}", room_name, peer_id);
            return effects;
        }

        info!("[{}] requested to join room: {}", peer_id, room_name);

        let room = self.rooms.entry(room_name.clone()).or_insert_with(Room::new);

        if room.is_full() {
            info!("[{}] rejected, room {} is full", peer_id, room_name);
            effects.push(peer_id, ServerMessage::room_full());
            return effects;
        }

        if let Some(pos) = room.position(&peer_id) {
            room.members[pos].user_data = user_data;
            return effects;
        }

        room.members.push(Member { id: peer_id, user_data });
        self.registry.record_join(&peer_id, &room_name);

        info!(
            "[{}] joined room: {} ({} participants)",
            peer_id,
            room_name,
            room.members.len()
        );

        if let [caller, acceptor] = room.members.as_slice() {
            room.call_started = Some(Instant::now());
            info!("Call started in room: {}", room_name);

            effects.push(
                caller.id,
                ServerMessage::ConnectPeer {
                    peer_id: acceptor.id,
                    role: Role::Caller,
                    user_data: acceptor.user_data.clone(),
                },
            );
            effects.push(
                acceptor.id,
                ServerMessage::ConnectPeer {
                    peer_id: caller.id,
                    role: Role::Acceptor,
                    user_data: caller.user_data.clone(),
                },
            );
        }

        effects
    }

    pub fn relay_candidate(&self, from: PeerId, to: PeerId, candidate: Value) -> Effects {
        self.relay(
            to,
            ServerMessage::IceCandidate {
                peer_id: from,
                ice_candidate: candidate,
            },
        )
    }

    pub fn relay_session_description(&self, from: PeerId, to: PeerId, description: Value) -> Effects {
        self.relay(
            to,
            ServerMessage::SessionDescription {
                peer_id: from,
                session_description: description,
            },
        )
    }

    fn relay(&self, to: PeerId, message: ServerMessage) -> Effects {
        let mut effects = Effects::default();
        if self.registry.contains(&to) {
            effects.push(to, message);
        } else {
            debug!("Dropping relay to unknown peer {}", to);
        }
        effects
    }

    pub fn leave_room(&mut self, peer_id: PeerId, room_name: &RoomName) -> Effects {
        let mut effects = Effects::default();

        let Some(room) = self.rooms.get_mut(room_name) else {
            self.registry.record_leave(&peer_id, room_name);
            return effects;
        };
        let Some(pos) = room.position(&peer_id) else {
            self.registry.record_leave(&peer_id, room_name);
            return effects;
        };

        info!("[{}] leaving room: {}", peer_id, room_name);

        for other in room.members.iter().filter(|m| m.id != peer_id) {
            effects.push(other.id, ServerMessage::PeerDisconnected { peer_id });
        }

        room.members.remove(pos);
        self.registry.record_leave(&peer_id, room_name);

        if room.members.is_empty() {
            if let Some(started) = room.call_started.take() {
                let duration = Duration::from_secs(started.elapsed().as_secs());
                info!(
                    "Call in room {} ended. Duration: {} seconds.",
                    room_name,
                    duration.as_secs()
                );
                effects.ended_calls.push(CallSummary {
                    room: room_name.clone(),
                    duration,
                });
            }
            self.rooms.remove(room_name);
            debug!("Room {} removed (empty)", room_name);
        }

        effects
    }

    pub fn on_disconnect(&mut self, peer_id: PeerId) -> Effects {
        let mut effects = Effects::default();
        for room_name in self.registry.joined_rooms(&peer_id) {
            effects.extend(self.leave_room(peer_id, &room_name));
        }
        if self.registry.unregister(&peer_id).is_some() {
            info!("[{}] disconnected", peer_id);
        }
        effects
    }

    /// Members of `room_name` in join order; empty if the room does not exist.
    pub fn room_members(&self, room_name: &RoomName) -> Vec<PeerId> {
        self.rooms
            .get(room_name)
            .map(|room| room.members.iter().map(|m| m.id).collect())
            .unwrap_or_default()
    }

    pub fn room_exists(&self, room_name: &RoomName) -> bool {
        self.rooms.contains_key(room_name)
    }

    pub fn has_call(&self, room_name: &RoomName) -> bool {
        self.rooms
            .get(room_name)
            .is_some_and(|room| room.call_started.is_some())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
