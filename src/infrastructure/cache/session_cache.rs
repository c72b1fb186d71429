//! Session Cache Service
//!
//! In-memory session table keyed by the session cookie value.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{AuthenticatedSession, SessionError, SessionResolver};

/// Session store used when the gateway runs without the full backend.
///
/// The HTTP layer inserts a row on login and removes it on logout; the gateway
/// only ever reads.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, AuthenticatedSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session under its cookie token
    pub fn insert(&self, token: impl Into<String>, session: AuthenticatedSession) {
        self.sessions.insert(token.into(), session);
    }

    /// Forget a session, returning it if it existed
    pub fn remove(&self, token: &str) -> Option<AuthenticatedSession> {
        self.sessions.remove(token).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionResolver for InMemorySessionStore {
    async fn resolve(&self, token: &str) -> Result<AuthenticatedSession, SessionError> {
        self.sessions
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or(SessionError::NotFound)
    }
}
