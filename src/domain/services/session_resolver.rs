//! Session lookup contract used during connection admission.

use async_trait::async_trait;

use crate::domain::value_objects::{SessionId, UserId};

/// An authenticated `(user, session)` pair handed to the gateway on upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl AuthenticatedSession {
    pub fn new(user_id: impl Into<UserId>, session_id: impl Into<SessionId>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// Errors raised while resolving a session token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Resolves the opaque session token carried by the request cookie.
///
/// Session issuance, expiry and ban checks live in the HTTP layer; the gateway
/// only needs to know who is on the other end of a socket.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<AuthenticatedSession, SessionError>;
}
