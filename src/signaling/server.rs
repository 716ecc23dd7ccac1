use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tracing::{debug, error, info, warn};

use super::actor::CoordinatorHandle;
use super::config::SignalingConfig;
use super::messages::ClientMessage;
use super::types::{OutboundMessage, PeerId, SignalingError};

#[derive(Debug, Clone, Copy)]
struct Keepalive {
    ping_interval: Duration,
    pong_timeout: Duration,
}

pub struct SignalingServer {
    listener: TcpListener,
    handle: CoordinatorHandle,
    keepalive: Keepalive,
}

impl SignalingServer {
    /// Bind the listener and spawn the coordinator actor
    pub async fn bind(config: &SignalingConfig) -> Result<Self, SignalingError> {
        config.validate()?;
        let listener = TcpListener::bind(&config.bind_addr).await?;
        info!("Signaling server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            handle: CoordinatorHandle::spawn(config.command_buffer),
            keepalive: Keepalive {
                ping_interval: config.ping_interval,
                pong_timeout: config.pong_timeout,
            },
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub async fn run(self) -> Result<(), SignalingError> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let handle = self.handle.clone();
            let keepalive = self.keepalive;

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, handle, keepalive).await {
                    error!("Connection error from {}: {}", addr, e);
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    handle: CoordinatorHandle,
    keepalive: Keepalive,
) -> Result<(), SignalingError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ctrl_tx, mut ctrl_rx) = mpsc::unbounded_channel::<Message>();

    let peer_id = handle.register(tx).await?;
    info!("WebSocket connection from {} as {}", addr, peer_id);

    let mut ping_interval = tokio::time::interval(keepalive.ping_interval);
    // the first tick completes immediately
    ping_interval.tick().await;
    let mut waiting_for_pong = false;
    let mut pong_deadline: Option<tokio::time::Instant> = None;

    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    let ws_msg = Message::Text(msg.into_inner());
                    if ws_tx.send(ws_msg).await.is_err() {
                        break;
                    }
                }
                Some(ctrl_msg) = ctrl_rx.recv() => {
                    if ws_tx.send(ctrl_msg).await.is_err() {
                        break;
                    }
                }
                else => break,
            }
        }
    });

    loop {
        let pong_timeout = async {
            match pong_deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = ping_interval.tick() => {
                if waiting_for_pong {
                    warn!("No Pong received, disconnecting {}", peer_id);
                    break;
                }
                if ctrl_tx.send(Message::Ping(Bytes::new())).is_err() {
                    break;
                }
                waiting_for_pong = true;
                pong_deadline = Some(tokio::time::Instant::now() + keepalive.pong_timeout);
                debug!("Ping sent to {}", peer_id);
            }

            _ = pong_timeout => {
                warn!("Pong timeout, disconnecting {}", peer_id);
                break;
            }

            msg = ws_rx.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", peer_id, e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => {
                        if let Err(e) = handle_text_message(text.as_str(), peer_id, &handle).await {
                            warn!("Message handling error: {}", e);
                            break;
                        }
                    }
                    Message::Pong(_) => {
                        waiting_for_pong = false;
                        pong_deadline = None;
                        debug!("Pong received from {}", peer_id);
                    }
                    Message::Close(_) => {
                        info!("Close received from {}", peer_id);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    handle.disconnect(peer_id).await?;

    send_task.abort();
    info!("WebSocket disconnected: {} ({})", peer_id, addr);

    Ok(())
}

/// Malformed frames are dropped; the only error is a dead coordinator.
async fn handle_text_message(
    text: &str,
    peer_id: PeerId,
    handle: &CoordinatorHandle,
) -> Result<(), SignalingError> {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            warn!("Invalid message from {}: {}", peer_id, e);
            return Ok(());
        }
    };

    match client_msg {
        ClientMessage::JoinRoom { room, user_data } => {
            handle.join_room(peer_id, room, user_data).await
        }
        ClientMessage::LeaveRoom { room } => handle.leave_room(peer_id, room).await,
        ClientMessage::RelayIceCandidate {
            peer_id: to,
            ice_candidate,
        } => handle.relay_ice_candidate(peer_id, to, ice_candidate).await,
        ClientMessage::RelaySessionDescription {
            peer_id: to,
            session_description,
        } => {
            handle
                .relay_session_description(peer_id, to, session_description)
                .await
        }
    }
}
