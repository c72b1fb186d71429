//! Connection Registry
//!
//! Directory of live connections keyed by user. A user key is present exactly
//! while that user has at least one registered connection, so first-in and
//! last-out transitions are decided under the same per-user entry lock as the
//! mutation that caused them.

use std::sync::Arc;

use dashmap::DashMap;

use super::connection::Connection;
use crate::domain::UserId;

/// Presence change caused by a registry mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The user's first connection was registered
    Online,
    /// The user's last connection was removed
    Offline,
    /// The user's online state did not change
    Unchanged,
}

/// Live connections by user
#[derive(Default)]
pub struct ConnectionRegistry {
    users: DashMap<UserId, Vec<Arc<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to its user's set
    pub fn register(&self, connection: Arc<Connection>) -> Transition {
        let mut connections = self.users.entry(connection.user_id()).or_default();
        connections.push(connection);
        if connections.len() == 1 {
            Transition::Online
        } else {
            Transition::Unchanged
        }
    }

    /// Remove a connection by identity. Removing an absent connection is a no-op.
    pub fn unregister(&self, connection: &Connection) -> Transition {
        let emptied = self
            .users
            .remove_if_mut(&connection.user_id(), |_, connections| {
                connections.retain(|c| c.id() != connection.id());
                connections.is_empty()
            });

        match emptied {
            Some(_) => Transition::Offline,
            None => Transition::Unchanged,
        }
    }

    /// Snapshot of a user's live connections.
    ///
    /// The registry lock is released before this returns, so callers may
    /// deliver to the snapshot freely. Connections already closing are skipped.
    pub fn connections_for(&self, user_id: UserId) -> Vec<Arc<Connection>> {
        self.users
            .get(&user_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|c| !c.is_closed())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of live connections (open tabs) for a user.
    ///
    /// Agrees with `connections_for`: connections already closing are not counted.
    pub fn session_count_for(&self, user_id: UserId) -> usize {
        self.users
            .get(&user_id)
            .map(|entry| entry.value().iter().filter(|c| !c.is_closed()).count())
            .unwrap_or(0)
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    /// Users with at least one live connection
    pub fn online_users(&self) -> Vec<UserId> {
        self.users.iter().map(|entry| *entry.key()).collect()
    }

    /// Snapshot of every registered connection
    pub fn all_connections(&self) -> Vec<Arc<Connection>> {
        self.users
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }

    /// Total registered connections across all users
    pub fn connection_count(&self) -> usize {
        self.users.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of users online
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
