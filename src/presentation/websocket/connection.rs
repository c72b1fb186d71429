//! WebSocket Connection State
//!
//! One live socket of one login session. The connection owns its send queue
//! and a close-once latch shared by the dispatcher and the reader.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use super::messages::Envelope;
use super::queue::{OutboundQueue, PushOutcome};
use crate::domain::{ConnectionId, SessionId, UserId};
use crate::infrastructure::metrics;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Upgrade accepted, not yet registered
    Connecting = 0,
    /// Registered and delivering
    Open = 1,
    /// Teardown started; queue closed
    Closing = 2,
    /// Both loops finished
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// A live connection of one user's session
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    session_id: SessionId,
    queue: OutboundQueue<Arc<Envelope>>,
    state: AtomicU8,
    close_latch: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl Connection {
    pub fn new(user_id: UserId, session_id: SessionId, queue_capacity: usize) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            id: ConnectionId::generate(),
            user_id,
            session_id,
            queue: OutboundQueue::new(queue_capacity),
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            close_latch: AtomicBool::new(false),
            shutdown,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether teardown has started
    pub fn is_closed(&self) -> bool {
        self.close_latch.load(Ordering::Acquire)
    }

    /// Number of envelopes waiting for the dispatcher
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue an envelope without blocking.
    ///
    /// Returns `false` when the connection is already closing. A full queue
    /// evicts its oldest envelope, which is logged and counted.
    pub fn enqueue(&self, envelope: Arc<Envelope>) -> bool {
        let channel = envelope.channel();
        match self.queue.push(envelope) {
            PushOutcome::Queued => {
                metrics::record_enqueued(channel);
                true
            }
            PushOutcome::Evicted(oldest) => {
                metrics::record_enqueued(channel);
                metrics::record_dropped(oldest.channel());
                tracing::warn!(
                    user_id = %self.user_id,
                    connection_id = %self.id,
                    dropped_channel = oldest.channel(),
                    "Send queue full, dropped oldest envelope"
                );
                true
            }
            PushOutcome::Closed => false,
        }
    }

    /// Next envelope to write; `None` once the connection is closing
    pub async fn next_outbound(&self) -> Option<Arc<Envelope>> {
        self.queue.pop().await
    }

    /// Start teardown.
    ///
    /// Returns `true` only for the first caller; later calls are no-ops. Closes
    /// the queue (waking the dispatcher) and signals the reader.
    pub fn close(&self) -> bool {
        if self.close_latch.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.state
            .store(ConnectionState::Closing as u8, Ordering::Release);
        let dropped = self.queue.close();
        if dropped > 0 {
            tracing::debug!(
                connection_id = %self.id,
                dropped,
                "Discarded pending envelopes on close"
            );
        }
        self.shutdown.send_replace(true);
        true
    }

    /// Resolves once `close` has been called
    pub async fn closed(&self) {
        let mut rx = self.shutdown.subscribe();
        // The sender lives as long as `self`, so this only returns once closed.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    pub(crate) fn mark_open(&self) {
        let _ = self.state.compare_exchange(
            ConnectionState::Connecting as u8,
            ConnectionState::Open as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub(crate) fn mark_closed(&self) {
        self.state
            .store(ConnectionState::Closed as u8, Ordering::Release);
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .finish()
    }
}
