//! WebSocket server and realtime hub.
//!
//! Applicant clients connect, authenticate with an access token, and
//! subscribe to their loan; the hub fans guarantor-progress events out to
//! every subscriber of that loan. Delivery is fire-and-forget: a dead
//! subscriber is pruned, never retried, and never blocks the others.

pub mod hub;
pub mod messages;
pub mod server;

pub use hub::{HubError, HubStats, RealtimeHub, SnapshotSource};
pub use messages::{ClientMessage, ServerMessage};
pub use server::WebSocketServer;
