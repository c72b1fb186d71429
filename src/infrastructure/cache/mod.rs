//! Cache Module
//!
//! In-memory directories the gateway reads from when the relational store is
//! not wired in.
//!
//! This module provides:
//! - `InMemorySessionStore`: session cookie -> `(UserId, SessionId)`
//! - `InMemoryChatDirectory`: user pair -> shared chat id, used as the peer key
//!   in presence events

mod chat_directory;
mod session_cache;

pub use chat_directory::InMemoryChatDirectory;
pub use session_cache::InMemorySessionStore;
