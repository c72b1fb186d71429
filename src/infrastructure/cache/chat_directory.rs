//! Chat Directory
//!
//! Maps an unordered pair of users to the id of the private chat they share.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{PeerKey, PeerKeyResolver, UserId};

/// In-memory pair -> chat id table.
///
/// Status events are keyed by chat id because that is how the web client
/// indexes its conversation list. Users without a shared chat are keyed by the
/// subject's own user id.
#[derive(Debug, Default)]
pub struct InMemoryChatDirectory {
    chats: DashMap<(UserId, UserId), i64>,
}

impl InMemoryChatDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the chat shared by `a` and `b`
    pub fn link(&self, a: UserId, b: UserId, chat_id: i64) {
        self.chats.insert(pair(a, b), chat_id);
    }

    /// Chat shared by `a` and `b`, in either order
    pub fn chat_id(&self, a: UserId, b: UserId) -> Option<i64> {
        self.chats.get(&pair(a, b)).map(|entry| *entry.value())
    }
}

fn pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
impl PeerKeyResolver for InMemoryChatDirectory {
    async fn peer_key(&self, subject: UserId, peer: UserId) -> PeerKey {
        self.chat_id(subject, peer).unwrap_or(subject.as_i64())
    }
}
