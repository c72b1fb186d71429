//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **UserId**: Integer account key shared with the relational store
//! - **SessionId**: Login session a socket was authenticated under
//! - **ConnectionId**: Per-socket identity used for removal by identity

mod ids;

pub use ids::*;
