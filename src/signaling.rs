//! WebSocket signaling relay pairing exactly two peers per room

mod actor;
mod config;
mod coordinator;
mod messages;
mod registry;
mod server;
mod types;

pub use actor::CoordinatorHandle;
pub use config::{DEFAULT_SIGNALING_PORT, SignalingArgs, SignalingConfig};
pub use coordinator::{Coordinator, Directive, Effects, ROOM_CAPACITY};
pub use messages::{ClientMessage, ROOM_FULL_MESSAGE, ServerMessage};
pub use registry::Registry;
pub use server::SignalingServer;
pub use types::{CallSummary, OutboundMessage, PeerId, Role, RoomName, SignalingError};
