use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kinds of notification the center knows how to ingest and display.
///
/// Wire payloads carry these as snake_case strings ("friend_request",
/// "chatroom_message", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    Mention,
    Report,
    System,
    Invitation,
    FriendRequest,
    Comment,
    ChatroomMessage,
}

impl NotificationKind {
    /// Kinds whose ingestion applies the secondary unread-subject dedup
    /// predicate: a push-delivered invitation and a later pull snapshot of
    /// the same invitation carry different derived ids, so id equality
    /// alone cannot suppress the duplicate.
    pub fn dedups_by_subject(self) -> bool {
        matches!(self, Self::Invitation | Self::FriendRequest)
    }
}

/// The canonical, deduplicated representation of one notification event.
///
/// `id` is assigned by the normalizer, not taken verbatim from the source;
/// it is unique within the live record set at all times. `title`/`body`
/// are display strings already resolved by the caller's i18n layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Source-of-truth for ordering, newest first.
    pub created_at: DateTime<Utc>,
    pub read: bool,
    /// The human actor responsible for the event (sender, mentioner, inviter).
    pub actor_name: Option<String>,
    /// The entity the notification is about (room id, post id, invitation
    /// id, friend-request id). Aggregation and dedup discriminant.
    pub subject_id: Option<String>,
    /// Human label for `subject_id` (room name, post title).
    pub subject_name: Option<String>,
    /// Kind-specific extras needed by downstream consumers (e.g. the
    /// invitation id for accept/decline). Opaque to the engine.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: serde_json::Map<String, serde_json::Value>,
}
