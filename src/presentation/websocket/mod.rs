//! WebSocket Gateway
//!
//! Real-time fan-out to live WebSocket connections.

pub mod connection;
pub mod gateway;
pub mod handler;
pub mod inbound;
pub mod messages;
pub mod presence;
pub mod queue;
pub mod registry;

pub use connection::{Connection, ConnectionState};
pub use gateway::{Gateway, DEFAULT_QUEUE_CAPACITY};
pub use handler::{serve_connection, ws_handler};
pub use inbound::{IgnoreInbound, InboundHandler};
pub use messages::{Envelope, InboundFrame, NotificationKind, PresenceStatus};
pub use presence::PresenceTracker;
pub use queue::{OutboundQueue, PushOutcome};
pub use registry::{ConnectionRegistry, Transition};
