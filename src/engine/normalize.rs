//! Record normalizer — the single dispatch point that turns heterogeneous
//! incoming payloads (push events of several names, REST snapshot entries)
//! into canonical [`NotificationRecord`]s.
//!
//! Identity derivation is kind-specific and deterministic, so repeated
//! delivery of the logically-same event maps to the same id and is
//! absorbed by the index. The one deliberate exception: a `message` event
//! with no source message id falls back to the arrival clock, which
//! defeats dedup under rapid duplicate delivery. Known limitation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::NormalizeError;
use crate::models::{NotificationKind, NotificationRecord};

// ── Push payload shapes ──────────────────────────────────────

/// A named event from the live push channel, decoded into a tagged union.
/// Every new event shape the transport grows requires exactly one new
/// variant here and one new arm in [`normalize_push`] — nothing else.
#[derive(Debug, Clone)]
pub enum PushEvent {
    PrivateMessage(PrivateMessagePayload),
    Mention(MentionPayload),
    ChatRoomInvitation(InvitationPayload),
    FriendRequest(FriendRequestPayload),
    /// The server's generic "new notification" event; carries its own
    /// kind discriminant (comment, chatroom_message, report, system, ...).
    Notification(GenericPayload),
}

impl PushEvent {
    /// Decode a named transport event into the union.
    pub fn from_named(name: &str, payload: Value) -> Result<Self, NormalizeError> {
        match name {
            "new private message" => Ok(Self::PrivateMessage(serde_json::from_value(payload)?)),
            "user mentioned" => Ok(Self::Mention(serde_json::from_value(payload)?)),
            "chat room invitation" => Ok(Self::ChatRoomInvitation(serde_json::from_value(payload)?)),
            "friend request received" => Ok(Self::FriendRequest(serde_json::from_value(payload)?)),
            "new notification" => Ok(Self::Notification(serde_json::from_value(payload)?)),
            other => Err(NormalizeError::UnknownEvent(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrivateMessagePayload {
    pub message_id: Option<String>,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub preview: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MentionPayload {
    pub content_id: Option<String>,
    pub message_id: Option<String>,
    pub notification_id: Option<String>,
    pub mentioned_by: Option<String>,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub preview: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvitationPayload {
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub invited_by: Option<String>,
    pub invitation_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FriendRequestPayload {
    pub request_id: Option<String>,
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenericPayload {
    pub id: Option<String>,
    pub kind: Option<NotificationKind>,
    pub title: String,
    pub body: String,
    pub actor_name: Option<String>,
    pub subject_id: Option<String>,
    pub subject_name: Option<String>,
    pub extra: serde_json::Map<String, Value>,
}

// ── Pull snapshot shape ──────────────────────────────────────

/// One entry of the REST notification-list snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct PullEntry {
    pub id: Option<String>,
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
    pub actor_name: Option<String>,
    pub subject_id: Option<String>,
    pub subject_name: Option<String>,
    pub message_id: Option<String>,
    pub content_id: Option<String>,
    pub invitation_id: Option<String>,
    pub request_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Map<String, Value>,
}

// ── Normalization ────────────────────────────────────────────

/// Normalize a push event into a canonical record. Pure; `arrival` is the
/// ingestion timestamp supplied by the host.
pub fn normalize_push(
    event: PushEvent,
    arrival: DateTime<Utc>,
) -> Result<NotificationRecord, NormalizeError> {
    match event {
        PushEvent::PrivateMessage(p) => {
            let actor = p.sender_name.ok_or(NormalizeError::MissingIdentity {
                event: "new private message",
                field: "sender_name",
            })?;
            // Clock fallback when the source omits its message id; see
            // module docs for the dedup caveat.
            let id = match &p.message_id {
                Some(mid) => format!("pm-{mid}"),
                None => format!("pm-{}", arrival.timestamp_millis()),
            };
            let mut payload = serde_json::Map::new();
            if let Some(mid) = &p.message_id {
                payload.insert("message_id".into(), Value::String(mid.clone()));
            }
            Ok(NotificationRecord {
                id,
                kind: NotificationKind::Message,
                title: actor.clone(),
                body: p.preview,
                created_at: arrival,
                read: false,
                actor_name: Some(actor),
                subject_id: p.sender_id,
                subject_name: None,
                payload,
            })
        }
        PushEvent::Mention(p) => {
            let discriminant = p
                .content_id
                .clone()
                .or_else(|| p.message_id.clone())
                .or_else(|| p.notification_id.clone())
                .ok_or(NormalizeError::MissingIdentity {
                    event: "user mentioned",
                    field: "content_id",
                })?;
            Ok(NotificationRecord {
                id: format!("mention-{discriminant}"),
                kind: NotificationKind::Mention,
                title: p.mentioned_by.clone().unwrap_or_default(),
                body: p.preview,
                created_at: arrival,
                read: false,
                actor_name: p.mentioned_by,
                subject_id: p.room_id,
                subject_name: p.room_name,
                payload: serde_json::Map::new(),
            })
        }
        PushEvent::ChatRoomInvitation(p) => {
            let room_id = p.room_id.ok_or(NormalizeError::MissingIdentity {
                event: "chat room invitation",
                field: "room_id",
            })?;
            let mut payload = serde_json::Map::new();
            if let Some(inv) = &p.invitation_id {
                payload.insert("invitation_id".into(), Value::String(inv.clone()));
            }
            Ok(NotificationRecord {
                // Push and pull invitation ids intentionally never collide;
                // cross-channel dedup is the index's secondary predicate.
                id: format!("invitation-{room_id}-{}", arrival.timestamp_millis()),
                kind: NotificationKind::Invitation,
                title: p.invited_by.clone().unwrap_or_default(),
                body: String::new(),
                created_at: arrival,
                read: false,
                actor_name: p.invited_by,
                subject_id: Some(room_id),
                subject_name: p.room_name,
                payload,
            })
        }
        PushEvent::FriendRequest(p) => {
            let request_id = p.request_id.ok_or(NormalizeError::MissingIdentity {
                event: "friend request received",
                field: "request_id",
            })?;
            Ok(NotificationRecord {
                id: format!(
                    "friend_request-{request_id}-{}",
                    arrival.timestamp_millis()
                ),
                kind: NotificationKind::FriendRequest,
                title: p.sender_name.clone().unwrap_or_default(),
                body: String::new(),
                created_at: arrival,
                read: false,
                actor_name: p.sender_name,
                subject_id: Some(request_id),
                subject_name: None,
                payload: serde_json::Map::new(),
            })
        }
        PushEvent::Notification(p) => Ok(NotificationRecord {
            id: p
                .id
                .unwrap_or_else(|| format!("notification-{}", arrival.timestamp_millis())),
            kind: p.kind.unwrap_or(NotificationKind::System),
            title: p.title,
            body: p.body,
            created_at: arrival,
            read: false,
            actor_name: p.actor_name,
            subject_id: p.subject_id,
            subject_name: p.subject_name,
            payload: p.extra,
        }),
    }
}

/// Normalize one pull-snapshot entry. Pure; `arrival` is only used when
/// the entry lacks its own timestamp or identity.
pub fn normalize_pull(
    entry: PullEntry,
    arrival: DateTime<Utc>,
) -> Result<NotificationRecord, NormalizeError> {
    let id = match entry.kind {
        NotificationKind::Message => match &entry.message_id {
            Some(mid) => format!("pm-{mid}"),
            None => format!("pm-{}", arrival.timestamp_millis()),
        },
        NotificationKind::Mention => {
            let discriminant = entry
                .content_id
                .clone()
                .or_else(|| entry.message_id.clone())
                .or_else(|| entry.id.clone())
                .ok_or(NormalizeError::MissingIdentity {
                    event: "notification list entry",
                    field: "content_id",
                })?;
            format!("mention-{discriminant}")
        }
        NotificationKind::Invitation => {
            let room_id =
                entry
                    .subject_id
                    .clone()
                    .ok_or(NormalizeError::MissingIdentity {
                        event: "notification list entry",
                        field: "subject_id",
                    })?;
            let invitation_id = entry
                .invitation_id
                .clone()
                .or_else(|| entry.id.clone())
                .unwrap_or_else(|| arrival.timestamp_millis().to_string());
            format!("invitation-{room_id}-{invitation_id}")
        }
        NotificationKind::FriendRequest => {
            let request_id = entry
                .request_id
                .clone()
                .or_else(|| entry.subject_id.clone())
                .ok_or(NormalizeError::MissingIdentity {
                    event: "notification list entry",
                    field: "request_id",
                })?;
            format!("friend_request-{request_id}-{}", arrival.timestamp_millis())
        }
        _ => entry
            .id
            .clone()
            .unwrap_or_else(|| format!("notification-{}", arrival.timestamp_millis())),
    };

    // friend_request dedups on the request id, so surface it as the subject
    // even when the snapshot put it in its own field.
    let subject_id = match entry.kind {
        NotificationKind::FriendRequest => entry.request_id.clone().or(entry.subject_id),
        _ => entry.subject_id,
    };

    let mut payload = entry.payload;
    if let Some(inv) = &entry.invitation_id {
        payload.insert("invitation_id".into(), Value::String(inv.clone()));
    }

    Ok(NotificationRecord {
        id,
        kind: entry.kind,
        title: entry.title,
        body: entry.body,
        created_at: entry.created_at.unwrap_or(arrival),
        read: entry.read,
        actor_name: entry.actor_name,
        subject_id,
        subject_name: entry.subject_name,
        payload,
    })
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn arrival() -> DateTime<Utc> {
        "2026-08-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_private_message_identity_from_source_id() {
        let ev = PushEvent::from_named(
            "new private message",
            json!({"message_id": "m1", "sender_name": "Alex", "preview": "hey"}),
        )
        .unwrap();
        let rec = normalize_push(ev, arrival()).unwrap();
        assert_eq!(rec.id, "pm-m1");
        assert_eq!(rec.kind, NotificationKind::Message);
        assert_eq!(rec.actor_name.as_deref(), Some("Alex"));
        assert!(!rec.read);
    }

    #[test]
    fn test_private_message_clock_fallback() {
        let ev = PushEvent::from_named(
            "new private message",
            json!({"sender_name": "Alex"}),
        )
        .unwrap();
        let rec = normalize_push(ev, arrival()).unwrap();
        assert_eq!(rec.id, format!("pm-{}", arrival().timestamp_millis()));
    }

    #[test]
    fn test_private_message_without_sender_is_dropped() {
        let ev =
            PushEvent::from_named("new private message", json!({"message_id": "m1"})).unwrap();
        let err = normalize_push(ev, arrival()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingIdentity { .. }));
    }

    #[test]
    fn test_mention_identity_prefers_content_id() {
        let ev = PushEvent::from_named(
            "user mentioned",
            json!({"content_id": "c7", "message_id": "m9", "mentioned_by": "Bo"}),
        )
        .unwrap();
        let rec = normalize_push(ev, arrival()).unwrap();
        assert_eq!(rec.id, "mention-c7");
    }

    #[test]
    fn test_mention_without_any_id_is_dropped() {
        let ev =
            PushEvent::from_named("user mentioned", json!({"mentioned_by": "Bo"})).unwrap();
        assert!(normalize_push(ev, arrival()).is_err());
    }

    #[test]
    fn test_push_and_pull_invitation_ids_never_collide() {
        let ev = PushEvent::from_named(
            "chat room invitation",
            json!({"room_id": "r1", "invited_by": "Bo"}),
        )
        .unwrap();
        let push_rec = normalize_push(ev, arrival()).unwrap();

        let entry: PullEntry = serde_json::from_value(json!({
            "kind": "invitation", "subject_id": "r1", "invitation_id": "inv-9"
        }))
        .unwrap();
        let pull_rec = normalize_pull(entry, arrival()).unwrap();

        assert_ne!(push_rec.id, pull_rec.id);
        assert_eq!(pull_rec.id, "invitation-r1-inv-9");
        // Both share the subject, which is what the index dedups on.
        assert_eq!(push_rec.subject_id, pull_rec.subject_id);
    }

    #[test]
    fn test_generic_event_keeps_source_id_and_kind() {
        let ev = PushEvent::from_named(
            "new notification",
            json!({"id": "n42", "kind": "chatroom_message", "title": "Riley",
                   "body": "hi all", "subject_id": "room-3", "subject_name": "general"}),
        )
        .unwrap();
        let rec = normalize_push(ev, arrival()).unwrap();
        assert_eq!(rec.id, "n42");
        assert_eq!(rec.kind, NotificationKind::ChatroomMessage);
        assert_eq!(rec.subject_name.as_deref(), Some("general"));
    }

    #[test]
    fn test_unknown_event_name_rejected() {
        let err = PushEvent::from_named("server rebooting", json!({})).unwrap_err();
        assert!(matches!(err, NormalizeError::UnknownEvent(_)));
    }

    #[test]
    fn test_pull_entry_keeps_read_flag_and_timestamp() {
        let ts: DateTime<Utc> = "2026-07-30T08:00:00Z".parse().unwrap();
        let entry: PullEntry = serde_json::from_value(json!({
            "id": "n1", "kind": "system", "title": "Maintenance",
            "created_at": ts.to_rfc3339(), "read": true
        }))
        .unwrap();
        let rec = normalize_pull(entry, arrival()).unwrap();
        assert_eq!(rec.id, "n1");
        assert!(rec.read);
        assert_eq!(rec.created_at, ts);
    }
}
