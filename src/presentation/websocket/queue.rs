//! Bounded per-connection send queue.
//!
//! Producers never wait: when the queue is full the oldest pending item is
//! evicted to make room. The single consumer (the connection's dispatcher)
//! parks on a `Notify` until an item arrives or the queue is closed.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Result of a push
#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome<T> {
    /// Appended without eviction
    Queued,
    /// Appended after evicting the returned oldest item
    Evicted(T),
    /// The queue is closed; the item was discarded
    Closed,
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// FIFO with drop-oldest overflow
pub struct OutboundQueue<T> {
    state: Mutex<QueueState<T>>,
    ready: Notify,
    capacity: usize,
}

impl<T> OutboundQueue<T> {
    /// Create a queue holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            ready: Notify::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Append an item without blocking
    pub fn push(&self, item: T) -> PushOutcome<T> {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return PushOutcome::Closed;
            }
            let evicted = if state.items.len() >= self.capacity {
                state.items.pop_front()
            } else {
                None
            };
            state.items.push_back(item);
            match evicted {
                Some(oldest) => PushOutcome::Evicted(oldest),
                None => PushOutcome::Queued,
            }
        };
        self.ready.notify_one();
        outcome
    }

    /// Wait for the next item; `None` once the queue is closed
    pub async fn pop(&self) -> Option<T> {
        loop {
            {
                let mut state = self.state.lock();
                if let Some(item) = state.items.pop_front() {
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            self.ready.notified().await;
        }
    }

    /// Close the queue, dropping anything still pending.
    ///
    /// Returns the number of items discarded.
    pub fn close(&self) -> usize {
        let dropped = {
            let mut state = self.state.lock();
            state.closed = true;
            let dropped = state.items.len();
            state.items.clear();
            dropped
        };
        self.ready.notify_one();
        dropped
    }
}
