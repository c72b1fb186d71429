//! Presence Tracker
//!
//! Announces online/offline flips to every other online user. Flips are
//! serialized through a gate so a peer always sees a user's transitions in the
//! order the registry produced them.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::messages::{Envelope, PresenceStatus};
use super::registry::ConnectionRegistry;
use crate::domain::{PeerKeyResolver, UserId};

pub struct PresenceTracker {
    peers: Arc<dyn PeerKeyResolver>,
    gate: Mutex<()>,
}

impl PresenceTracker {
    pub fn new(peers: Arc<dyn PeerKeyResolver>) -> Self {
        Self {
            peers,
            gate: Mutex::new(()),
        }
    }

    /// Hold while mutating the registry and broadcasting the resulting flip.
    ///
    /// The gate is process-wide and is held across one `peer_key` lookup per
    /// online user, so connects and disconnects run one at a time. With the
    /// in-memory directory a lookup is a map read; a resolver backed by a
    /// remote store makes each flip cost that many round trips while every
    /// other admission and teardown waits.
    pub(crate) async fn gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    /// Push a `status` envelope to every connection of every other online user.
    ///
    /// Returns the number of connections the status was queued on.
    pub async fn broadcast_online_status(
        &self,
        registry: &ConnectionRegistry,
        user_id: UserId,
        status: PresenceStatus,
    ) -> usize {
        let mut delivered = 0;
        for peer in registry.online_users() {
            if peer == user_id {
                continue;
            }
            let key = self.peers.peer_key(user_id, peer).await;
            let envelope = Arc::new(Envelope::Status {
                user: key,
                status: status.is_online(),
            });
            for connection in registry.connections_for(peer) {
                if connection.enqueue(envelope.clone()) {
                    delivered += 1;
                }
            }
        }

        tracing::debug!(
            user_id = %user_id,
            online = status.is_online(),
            delivered,
            "Broadcast online status"
        );
        delivered
    }
}
