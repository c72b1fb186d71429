//! WebSocket Gateway
//!
//! Owns the connection registry and routes events to live connections. HTTP
//! handlers call the `push_*` methods after committing their write; every
//! push is fire-and-forget and never waits on a socket.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::connection::Connection;
use super::inbound::{IgnoreInbound, InboundHandler};
use super::messages::{Envelope, NotificationKind, PresenceStatus};
use super::presence::PresenceTracker;
use super::registry::{ConnectionRegistry, Transition};
use crate::domain::{PeerKeyResolver, SessionId, UserId};
use crate::infrastructure::metrics;

/// Default per-connection send queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Live-connection registry plus fan-out router
pub struct Gateway {
    registry: ConnectionRegistry,
    presence: PresenceTracker,
    inbound: Arc<dyn InboundHandler>,
    queue_capacity: usize,
}

impl Gateway {
    pub fn new(peers: Arc<dyn PeerKeyResolver>, queue_capacity: usize) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            presence: PresenceTracker::new(peers),
            inbound: Arc::new(IgnoreInbound),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Replace the handler receiving inbound client frames
    pub fn with_inbound_handler(mut self, handler: Arc<dyn InboundHandler>) -> Self {
        self.inbound = handler;
        self
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub(crate) fn inbound(&self) -> &dyn InboundHandler {
        self.inbound.as_ref()
    }

    // --- Connection lifecycle ---

    /// Create a connection for an authenticated session, not yet registered
    pub fn open_connection(&self, user_id: UserId, session_id: SessionId) -> Arc<Connection> {
        Arc::new(Connection::new(user_id, session_id, self.queue_capacity))
    }

    /// Register a connection and announce the user online if it is their first
    pub async fn connect(&self, connection: &Arc<Connection>) {
        let _gate = self.presence.gate().await;
        let transition = self.registry.register(connection.clone());
        connection.mark_open();
        self.publish_counts();

        tracing::info!(
            user_id = %connection.user_id(),
            session_id = %connection.session_id(),
            connection_id = %connection.id(),
            "Connection registered"
        );

        if transition == Transition::Online {
            self.presence
                .broadcast_online_status(&self.registry, connection.user_id(), PresenceStatus::Online)
                .await;
        }
    }

    /// Tear a connection down exactly once.
    ///
    /// Safe to call from the dispatcher, the reader and shutdown concurrently;
    /// only the first call unregisters and, if the user has no connection
    /// left, announces them offline.
    pub async fn disconnect(&self, connection: &Connection) {
        if !connection.close() {
            return;
        }

        let _gate = self.presence.gate().await;
        let transition = self.registry.unregister(connection);
        self.publish_counts();

        tracing::info!(
            user_id = %connection.user_id(),
            session_id = %connection.session_id(),
            connection_id = %connection.id(),
            "Connection unregistered"
        );

        if transition == Transition::Offline {
            self.presence
                .broadcast_online_status(&self.registry, connection.user_id(), PresenceStatus::Offline)
                .await;
        }
    }

    /// Close every connection opened by one login session (logout).
    ///
    /// The user's other sessions stay connected; they go offline only if this
    /// session held their last connection. Returns the number closed.
    pub async fn disconnect_session(&self, user_id: UserId, session_id: &SessionId) -> usize {
        let connections: Vec<_> = self
            .registry
            .connections_for(user_id)
            .into_iter()
            .filter(|connection| connection.session_id() == session_id)
            .collect();

        for connection in &connections {
            self.disconnect(connection).await;
        }

        tracing::info!(
            user_id = %user_id,
            session_id = %session_id,
            closed = connections.len(),
            "Session logged out"
        );
        connections.len()
    }

    /// Close every live connection (process shutdown)
    pub async fn shutdown(&self) {
        let connections = self.registry.all_connections();
        tracing::info!(connections = connections.len(), "Closing all connections");
        for connection in connections {
            self.disconnect(&connection).await;
        }
    }

    // --- Fan-out ---

    /// Queue an envelope on every live connection of `user_id`.
    ///
    /// Returns how many connections accepted it; zero when the user is offline.
    pub fn push_to_user(&self, user_id: UserId, envelope: Envelope) -> usize {
        self.push_filtered(user_id, envelope, |_| true)
    }

    /// Deliver a chat payload to every session of `user_id` except `exclude_session`
    pub fn push_message<P>(
        &self,
        exclude_session: Option<&SessionId>,
        user_id: UserId,
        payload: &P,
    ) -> usize
    where
        P: Serialize + ?Sized,
    {
        let Some(payload) = to_payload(payload, "chat") else {
            return 0;
        };
        self.push_filtered(user_id, Envelope::Chat { payload }, |connection| {
            exclude_session != Some(connection.session_id())
        })
    }

    /// Deliver a notification event to all of a user's sessions
    pub fn push_notification<P>(&self, kind: NotificationKind, user_id: UserId, payload: &P) -> usize
    where
        P: Serialize + ?Sized,
    {
        let Some(payload) = to_payload(payload, "notifications") else {
            return 0;
        };
        self.push_to_user(user_id, Envelope::notification(kind, user_id, payload))
    }

    /// Announce a newly created post to the author's sessions
    pub fn push_new_post<P>(&self, user_id: UserId, payload: &P) -> usize
    where
        P: Serialize + ?Sized,
    {
        let Some(payload) = to_payload(payload, "new-post") else {
            return 0;
        };
        self.push_to_user(user_id, Envelope::NewPost { payload })
    }

    /// Announce a newly created chat to a participant's sessions
    pub fn push_new_chat<P>(&self, user_id: UserId, payload: &P) -> usize
    where
        P: Serialize + ?Sized,
    {
        let Some(payload) = to_payload(payload, "new-chat") else {
            return 0;
        };
        self.push_to_user(user_id, Envelope::NewChat { payload })
    }

    /// Fan a chat message out to a conversation's members.
    ///
    /// Every recipient receives the message on all sessions; when the sender
    /// is among the recipients, only the session that sent it is skipped.
    pub fn deliver_chat<P>(
        &self,
        sender_session: &SessionId,
        sender: UserId,
        recipients: &[UserId],
        payload: &P,
    ) -> usize
    where
        P: Serialize + ?Sized,
    {
        let Some(payload) = to_payload(payload, "chat") else {
            return 0;
        };
        let envelope = Arc::new(Envelope::Chat { payload });
        recipients
            .iter()
            .map(|&recipient| {
                let exclude = (recipient == sender).then_some(sender_session);
                self.enqueue_filtered(recipient, &envelope, |connection| {
                    exclude != Some(connection.session_id())
                })
            })
            .sum()
    }

    // --- Queries ---

    /// Number of open tabs of a user
    pub fn session_count_for(&self, user_id: UserId) -> usize {
        self.registry.session_count_for(user_id)
    }

    pub fn is_user_online(&self, user_id: UserId) -> bool {
        self.registry.is_online(user_id)
    }

    /// Total live connections
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// Users with at least one live connection
    pub fn online_user_count(&self) -> usize {
        self.registry.user_count()
    }

    fn push_filtered<F>(&self, user_id: UserId, envelope: Envelope, include: F) -> usize
    where
        F: Fn(&Connection) -> bool,
    {
        self.enqueue_filtered(user_id, &Arc::new(envelope), include)
    }

    fn enqueue_filtered<F>(&self, user_id: UserId, envelope: &Arc<Envelope>, include: F) -> usize
    where
        F: Fn(&Connection) -> bool,
    {
        let delivered = self
            .registry
            .connections_for(user_id)
            .iter()
            .filter(|connection| include(connection))
            .filter(|connection| connection.enqueue(envelope.clone()))
            .count();

        tracing::trace!(
            user_id = %user_id,
            channel = envelope.channel(),
            delivered,
            "Pushed envelope"
        );
        delivered
    }

    fn publish_counts(&self) {
        metrics::set_live_counts(self.registry.connection_count(), self.registry.user_count());
    }
}

fn to_payload<P>(payload: &P, channel: &str) -> Option<Value>
where
    P: Serialize + ?Sized,
{
    match serde_json::to_value(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(channel, error = %e, "Failed to serialize push payload");
            None
        }
    }
}
