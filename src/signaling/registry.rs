use std::collections::{BTreeSet, HashMap};

use super::types::{PeerId, RoomName};

struct PeerEntry<H> {
    handle: H,
    rooms: BTreeSet<RoomName>,
}

/// Live participants, keyed by connection identity.
///
/// `H` is whatever the transport needs to deliver to a participant; the
/// server uses the outbound channel sender, tests use `()`.
pub struct Registry<H> {
    peers: HashMap<PeerId, PeerEntry<H>>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Registry<H> {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    /// Map `id` to `handle`. Re-registering an id replaces the handle but
    /// keeps the rooms it already joined.
    pub fn register(&mut self, id: PeerId, handle: H) {
        match self.peers.get_mut(&id) {
            Some(entry) => entry.handle = handle,
            None => {
                self.peers.insert(
                    id,
                    PeerEntry {
                        handle,
                        rooms: BTreeSet::new(),
                    },
                );
            }
        }
    }

    pub fn unregister(&mut self, id: &PeerId) -> Option<H> {
        self.peers.remove(id).map(|entry| entry.handle)
    }

    pub fn lookup(&self, id: &PeerId) -> Option<&H> {
        self.peers.get(id).map(|entry| &entry.handle)
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Rooms `id` is currently recorded in, in name order.
    pub fn joined_rooms(&self, id: &PeerId) -> Vec<RoomName> {
        self.peers
            .get(id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// No-op for unregistered ids.
    pub(crate) fn record_join(&mut self, id: &PeerId, room: &RoomName) {
        if let Some(entry) = self.peers.get_mut(id) {
            entry.rooms.insert(room.clone());
        }
    }

    pub(crate) fn record_leave(&mut self, id: &PeerId, room: &RoomName) {
        if let Some(entry) = self.peers.get_mut(id) {
            entry.rooms.remove(room);
        }
    }
}
