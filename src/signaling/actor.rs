use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use super::coordinator::{Coordinator, Effects};
use super::types::{OutboundMessage, PeerId, RoomName, SignalingError};

pub type PeerSender = mpsc::UnboundedSender<OutboundMessage>;

/// Commands sent to the coordinator actor
pub(crate) enum CoordinatorCommand {
    Register {
        peer_tx: PeerSender,
        reply: oneshot::Sender<PeerId>,
    },
    Join {
        peer_id: PeerId,
        room: RoomName,
        user_data: Value,
    },
    Leave {
        peer_id: PeerId,
        room: RoomName,
    },
    RelayIceCandidate {
        from: PeerId,
        to: PeerId,
        candidate: Value,
    },
    RelaySessionDescription {
        from: PeerId,
        to: PeerId,
        description: Value,
    },
    Disconnect {
        peer_id: PeerId,
    },
    RoomMembers {
        room: RoomName,
        reply: oneshot::Sender<Vec<PeerId>>,
    },
}

pub(crate) async fn coordinator_actor(mut rx: mpsc::Receiver<CoordinatorCommand>) {
    let mut coordinator: Coordinator<PeerSender> = Coordinator::new();

    while let Some(cmd) = rx.recv().await {
        let effects = match cmd {
            CoordinatorCommand::Register { peer_tx, reply } => {
                let peer_id = unused_peer_id(&coordinator);
                coordinator.register(peer_id, peer_tx);
                info!("[{}] connected", peer_id);
                let _ = reply.send(peer_id);
                continue;
            }

            CoordinatorCommand::Join {
                peer_id,
                room,
                user_data,
            } => coordinator.join_room(peer_id, room, user_data),

            CoordinatorCommand::Leave { peer_id, room } => coordinator.leave_room(peer_id, &room),

            CoordinatorCommand::RelayIceCandidate {
                from,
                to,
                candidate,
            } => {
                debug!("Relaying ICE candidate {} -> {}", from, to);
                coordinator.relay_candidate(from, to, candidate)
            }

            CoordinatorCommand::RelaySessionDescription {
                from,
                to,
                description,
            } => {
                debug!("Relaying session description {} -> {}", from, to);
                coordinator.relay_session_description(from, to, description)
            }

            CoordinatorCommand::Disconnect { peer_id } => coordinator.on_disconnect(peer_id),

            CoordinatorCommand::RoomMembers { room, reply } => {
                let _ = reply.send(coordinator.room_members(&room));
                continue;
            }
        };

        dispatch(&coordinator, effects);
    }
}

fn unused_peer_id(coordinator: &Coordinator<PeerSender>) -> PeerId {
    loop {
        let id = PeerId::generate();
        if !coordinator.registry().contains(&id) {
            return id;
        }
    }
}

/// Deliver directives to whoever is still registered. Sends are
/// non-blocking; a closed channel means the peer is on its way out.
fn dispatch(coordinator: &Coordinator<PeerSender>, effects: Effects) {
    for directive in effects.directives {
        let Some(tx) = coordinator.registry().lookup(&directive.target) else {
            continue;
        };
        match serde_json::to_string(&directive.message) {
            Ok(json) => {
                let _ = tx.send(OutboundMessage::from(json));
            }
            Err(e) => error!("Failed to serialize message for {}: {}", directive.target, e),
        }
    }
}

/// Handle to communicate with the coordinator actor
#[derive(Clone)]
pub struct CoordinatorHandle {
    pub(crate) tx: mpsc::Sender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    /// Spawn the coordinator actor on the current runtime
    pub fn spawn(buffer: usize) -> Self {
        let (tx, rx) = mpsc::channel::<CoordinatorCommand>(buffer);
        tokio::spawn(coordinator_actor(rx));
        Self { tx }
    }

    async fn send(&self, cmd: CoordinatorCommand) -> Result<(), SignalingError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| SignalingError::Internal("actor channel closed".to_string()))
    }

    /// Register a new connection and get its generated identity
    pub async fn register(&self, peer_tx: PeerSender) -> Result<PeerId, SignalingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(CoordinatorCommand::Register {
            peer_tx,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| SignalingError::Internal("actor channel closed".to_string()))
    }

    pub async fn join_room(
        &self,
        peer_id: PeerId,
        room: RoomName,
        user_data: Value,
    ) -> Result<(), SignalingError> {
        self.send(CoordinatorCommand::Join {
            peer_id,
            room,
            user_data,
        })
        .await
    }

    pub async fn leave_room(&self, peer_id: PeerId, room: RoomName) -> Result<(), SignalingError> {
        self.send(CoordinatorCommand::Leave { peer_id, room }).await
    }

    pub async fn relay_ice_candidate(
        &self,
        from: PeerId,
        to: PeerId,
        candidate: Value,
    ) -> Result<(), SignalingError> {
        self.send(CoordinatorCommand::RelayIceCandidate {
            from,
            to,
            candidate,
        })
        .await
    }

    pub async fn relay_session_description(
        &self,
        from: PeerId,
        to: PeerId,
        description: Value,
    ) -> Result<(), SignalingError> {
        self.send(CoordinatorCommand::RelaySessionDescription {
            from,
            to,
            description,
        })
        .await
    }

    /// Leave every joined room and forget the connection
    pub async fn disconnect(&self, peer_id: PeerId) -> Result<(), SignalingError> {
        self.send(CoordinatorCommand::Disconnect { peer_id }).await
    }

    /// Current members of a room in join order
    pub async fn room_members(&self, room: RoomName) -> Result<Vec<PeerId>, SignalingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(CoordinatorCommand::RoomMembers {
            room,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| SignalingError::Internal("actor channel closed".to_string()))
    }
}
