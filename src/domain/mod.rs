//! # Domain Layer
//!
//! Identifiers and the contracts the real-time core expects from the rest of
//! the backend. Nothing here depends on axum, tokio or any storage engine.
//!
//! ## Structure
//!
//! - **value_objects**: `UserId`, `SessionId`, `ConnectionId`
//! - **services**: collaborator traits implemented outside the core
//!   (session lookup, presence peer keys)

pub mod services;
pub mod value_objects;

pub use services::*;
pub use value_objects::*;
