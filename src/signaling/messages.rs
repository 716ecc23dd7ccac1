use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{PeerId, Role, RoomName};

pub const ROOM_FULL_MESSAGE: &str = "Room is full. Try another room.";

/// Messages sent from client to server
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Join (or create) a two-party room
    JoinRoom {
        room: RoomName,
        #[serde(rename = "userData", default)]
        user_data: Value,
    },

    /// Leave a room without closing the connection
    LeaveRoom { room: RoomName },

    /// Forward an ICE candidate to another participant
    RelayIceCandidate { peer_id: PeerId, ice_candidate: Value },

    /// Forward an SDP offer/answer to another participant
    RelaySessionDescription {
        peer_id: PeerId,
        session_description: Value,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Join rejected, the room already has two members
    RoomFull { message: String },

    /// The room is complete; start the peer connection with `peer_id`
    ConnectPeer {
        peer_id: PeerId,
        role: Role,
        #[serde(rename = "userData")]
        user_data: Value,
    },

    IceCandidate { peer_id: PeerId, ice_candidate: Value },

    SessionDescription {
        peer_id: PeerId,
        session_description: Value,
    },

    /// A co-member left the room or dropped its connection
    PeerDisconnected { peer_id: PeerId },
}

impl ServerMessage {
    pub fn room_full() -> Self {
        ServerMessage::RoomFull {
            message: ROOM_FULL_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_join_room() {
        let json = r#"{"type": "join-room", "room": "r1", "userData": {"name": "alice"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        if let ClientMessage::JoinRoom { room, user_data } = msg {
            assert_eq!(room.as_str(), "r1");
            assert_eq!(user_data, json!({"name": "alice"}));
        } else {
            panic!("Expected JoinRoom");
        }
    }

    #[test]
    fn parse_join_room_without_user_data() {
        let json = r#"{"type": "join-room", "room": "r1"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        if let ClientMessage::JoinRoom { user_data, .. } = msg {
            assert!(user_data.is_null());
        } else {
            panic!("Expected JoinRoom");
        }
    }

    #[test]
    fn parse_leave_room() {
        let json = r#"{"type": "leave-room", "room": "r1"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::LeaveRoom { room } if room.as_str() == "r1"));
    }

    #[test]
    fn parse_relay_ice_candidate() {
        let json = r#"{
            "type": "relay-ice-candidate",
            "peer_id": "peer_abcd1234",
            "ice_candidate": {"candidate": "candidate:1 1 udp 2122260223 10.0.0.1 54321 typ host", "sdpMLineIndex": 0}
        }"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        if let ClientMessage::RelayIceCandidate {
            peer_id,
            ice_candidate,
        } = msg
        {
            assert_eq!(peer_id.as_str(), "peer_abcd1234");
            assert_eq!(ice_candidate["sdpMLineIndex"], 0);
        } else {
            panic!("Expected RelayIceCandidate");
        }
    }

    #[test]
    fn parse_relay_session_description() {
        let json = r#"{"type": "relay-session-description", "peer_id": "peer_abcd1234", "session_description": {"type": "offer", "sdp": "v=0"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        if let ClientMessage::RelaySessionDescription {
            session_description,
            ..
        } = msg
        {
            assert_eq!(session_description, json!({"type": "offer", "sdp": "v=0"}));
        } else {
            panic!("Expected RelaySessionDescription");
        }
    }

    #[test]
    fn reject_unknown_type() {
        let json = r#"{"type": "create_room"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn serialize_room_full() {
        let json = serde_json::to_value(ServerMessage::room_full()).unwrap();
        assert_eq!(
            json,
            json!({"type": "room-full", "message": "Room is full. Try another room."})
        );
    }

    #[test]
    fn serialize_connect_peer() {
        let msg = ServerMessage::ConnectPeer {
            peer_id: PeerId::from("peer_abcd1234"),
            role: Role::Caller,
            user_data: json!({"name": "bob"}),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "connect-peer",
                "peer_id": "peer_abcd1234",
                "role": "caller",
                "userData": {"name": "bob"}
            })
        );
    }

    #[test]
    fn serialize_relayed_payloads_verbatim() {
        let candidate = json!({"candidate": "c", "sdpMid": "0", "extra": [1, 2, 3]});
        let msg = ServerMessage::IceCandidate {
            peer_id: PeerId::from("peer_00000001"),
            ice_candidate: candidate.clone(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ice-candidate");
        assert_eq!(json["ice_candidate"], candidate);

        let msg = ServerMessage::SessionDescription {
            peer_id: PeerId::from("peer_00000001"),
            session_description: json!("opaque"),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "session-description");
        assert_eq!(json["session_description"], "opaque");
    }

    #[test]
    fn serialize_peer_disconnected() {
        let msg = ServerMessage::PeerDisconnected {
            peer_id: PeerId::from("peer_abcd1234"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"peer-disconnected","peer_id":"peer_abcd1234"}"#);
    }
}
