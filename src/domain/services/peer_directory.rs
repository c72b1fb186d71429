//! Peer key lookup used by presence broadcasts.

use async_trait::async_trait;

use crate::domain::value_objects::UserId;

/// Key a client uses to locate `subject` in its own UI.
///
/// The web client indexes its conversation list by chat id, so a status
/// change for `subject` is announced to `peer` under the id of the chat the
/// two share.
pub type PeerKey = i64;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PeerKeyResolver: Send + Sync {
    /// Key under which `peer` should see status changes of `subject`.
    async fn peer_key(&self, subject: UserId, peer: UserId) -> PeerKey;
}
