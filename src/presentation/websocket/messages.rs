//! WebSocket Message Types
//!
//! Envelopes pushed to clients and the frame shape clients may send back.
//! Every outbound envelope is one JSON object per text frame, tagged by its
//! `channel` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{PeerKey, UserId};

/// Outbound envelope, one variant per channel tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel")]
pub enum Envelope {
    #[serde(rename = "chat")]
    Chat { payload: Value },

    #[serde(rename = "notifications")]
    Notification { to: UserId, payload: Value },
    #[serde(rename = "notifications-new")]
    NotificationNew { to: UserId, payload: Value },
    #[serde(rename = "notifications-read")]
    NotificationRead { to: UserId, payload: Value },
    #[serde(rename = "notifications-delete")]
    NotificationDelete { to: UserId, payload: Value },
    #[serde(rename = "notifications-all-read")]
    NotificationAllRead { to: UserId, payload: Value },

    #[serde(rename = "status")]
    Status { user: PeerKey, status: bool },

    #[serde(rename = "new-chat")]
    NewChat { payload: Value },
    #[serde(rename = "new-post")]
    NewPost { payload: Value },
}

impl Envelope {
    /// Build the notification envelope for `kind`
    pub fn notification(kind: NotificationKind, to: UserId, payload: Value) -> Self {
        match kind {
            NotificationKind::General => Envelope::Notification { to, payload },
            NotificationKind::New => Envelope::NotificationNew { to, payload },
            NotificationKind::Read => Envelope::NotificationRead { to, payload },
            NotificationKind::Delete => Envelope::NotificationDelete { to, payload },
            NotificationKind::AllRead => Envelope::NotificationAllRead { to, payload },
        }
    }

    /// Channel tag as it appears on the wire
    pub fn channel(&self) -> &'static str {
        match self {
            Envelope::Chat { .. } => "chat",
            Envelope::Notification { .. } => "notifications",
            Envelope::NotificationNew { .. } => "notifications-new",
            Envelope::NotificationRead { .. } => "notifications-read",
            Envelope::NotificationDelete { .. } => "notifications-delete",
            Envelope::NotificationAllRead { .. } => "notifications-all-read",
            Envelope::Status { .. } => "status",
            Envelope::NewChat { .. } => "new-chat",
            Envelope::NewPost { .. } => "new-post",
        }
    }
}

/// Notification sub-channel, appended to `notifications` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Full notification list refresh
    General,
    /// A notification was created
    New,
    /// A notification was marked read
    Read,
    /// A notification was deleted
    Delete,
    /// Every notification was marked read
    AllRead,
}

impl NotificationKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            NotificationKind::General => "",
            NotificationKind::New => "-new",
            NotificationKind::Read => "-read",
            NotificationKind::Delete => "-delete",
            NotificationKind::AllRead => "-all-read",
        }
    }
}

/// Online state announced in `status` envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl PresenceStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, PresenceStatus::Online)
    }
}

/// Frame received from a client
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundFrame {
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}
