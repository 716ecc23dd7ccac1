use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tokio_tungstenite::tungstenite::{self, Utf8Bytes};

/// Signaling server errors
#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

const PEER_ID_LEN: usize = 13;
const HEX_CHARS: &[u8] = b"0123456789abcdef";

/// Peer ID: 13-byte fixed array ("peer_" + 8 hex)
///
/// Wire ids longer than 13 bytes keep only their prefix and are flagged
/// `overlong`, which makes them unequal to every generated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId {
    bytes: [u8; PEER_ID_LEN],
    len: u8,
    overlong: bool,
}

impl PeerId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; PEER_ID_LEN];
        bytes[..5].copy_from_slice(b"peer_");

        let mut rng = rand::rng();
        let value: u32 = rng.random();

        for i in 0..8 {
            let nibble = ((value >> (28 - i * 4)) & 0xF) as usize;
            bytes[5 + i] = HEX_CHARS[nibble];
        }
        Self {
            bytes,
            len: PEER_ID_LEN as u8,
            overlong: false,
        }
    }

    /// The stored prefix. Overlong ids show only their first 13 bytes.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())?;
        if self.overlong {
            f.write_str("...")?;
        }
        Ok(())
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        let mut bytes = [0u8; PEER_ID_LEN];
        let src = s.as_bytes();
        let mut len = src.len().min(PEER_ID_LEN);
        while !s.is_char_boundary(len) {
            len -= 1;
        }
        bytes[..len].copy_from_slice(&src[..len]);
        Self {
            bytes,
            len: len as u8,
            overlong: src.len() > PEER_ID_LEN,
        }
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(PeerId::from(s.as_str()))
    }
}

/// Caller-supplied room name. Any string is a valid name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Handshake role handed out when a room fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Caller,
    Acceptor,
}

/// Reported when the last member leaves a room that had an active call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSummary {
    pub room: RoomName,
    /// Elapsed time since activation, floored to whole seconds.
    pub duration: Duration,
}

/// Wrapper for outbound WebSocket messages using tungstenite's Utf8Bytes.
#[derive(Debug, Clone)]
pub struct OutboundMessage(Utf8Bytes);

impl OutboundMessage {
    /// Create a new outbound message from any string type
    pub fn new(s: impl Into<Utf8Bytes>) -> Self {
        Self(s.into())
    }

    /// Get the inner Utf8Bytes for tungstenite Message::Text
    pub fn into_inner(self) -> Utf8Bytes {
        self.0
    }
}

impl From<String> for OutboundMessage {
    fn from(s: String) -> Self {
        Self(Utf8Bytes::from(s))
    }
}
