//! # Domain Services
//!
//! Contracts for collaborators the fan-out core calls into but does not own.
//!
//! ## Services
//!
//! - **SessionResolver**: maps a session cookie to an authenticated `(UserId, SessionId)`
//! - **PeerKeyResolver**: names a user from a peer's point of view in status events

mod peer_directory;
mod session_resolver;

pub use peer_directory::*;
pub use session_resolver::*;
