//! Aggregation grouper — collapses the live record set into display
//! groups by kind-specific keys and renders cardinality-sensitive
//! titles from the configured phrase templates.

use std::collections::HashMap;

use crate::config::Phrases;
use crate::models::{NotificationGroup, NotificationKind, NotificationRecord};

/// The aggregation key deciding which records collapse together.
/// `None` for mentions: they are always rendered as standalone entries.
/// Records missing the field their kind keys on degrade to an `other-{id}`
/// singleton so unrelated records never collapse under an empty key.
pub fn group_key(record: &NotificationRecord) -> Option<String> {
    let key = match record.kind {
        NotificationKind::Mention => return None,
        // Direct messages group by conversation partner.
        NotificationKind::Message => record
            .subject_id
            .as_deref()
            .or(record.actor_name.as_deref())
            .map(|k| format!("message-{k}")),
        NotificationKind::ChatroomMessage => record
            .subject_id
            .as_deref()
            .map(|room| format!("chatroom-{room}")),
        NotificationKind::Comment => record
            .subject_id
            .as_deref()
            .map(|post| format!("comment-{post}")),
        NotificationKind::Invitation => record
            .subject_id
            .as_deref()
            .map(|room| format!("invitation-{room}")),
        _ => None,
    };
    Some(key.unwrap_or_else(|| format!("other-{}", record.id)))
}

/// Partition aggregable records into groups. Members end up newest-first;
/// the caller handles outer ordering.
pub fn build_groups<'a>(
    records: impl Iterator<Item = &'a NotificationRecord>,
    phrases: &Phrases,
) -> Vec<NotificationGroup> {
    let mut buckets: HashMap<String, Vec<NotificationRecord>> = HashMap::new();
    let mut key_order: Vec<String> = Vec::new();

    for record in records {
        let Some(key) = group_key(record) else {
            continue;
        };
        let bucket = buckets.entry(key.clone()).or_insert_with(|| {
            key_order.push(key);
            Vec::new()
        });
        bucket.push(record.clone());
    }

    key_order
        .into_iter()
        .filter_map(|key| {
            let mut members = buckets.remove(&key)?;
            members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Some(finish_group(key, members, phrases))
        })
        .collect()
}

/// Compute the display strings for a fully-collected group.
fn finish_group(
    group_key: String,
    records: Vec<NotificationRecord>,
    phrases: &Phrases,
) -> NotificationGroup {
    let newest = &records[0];
    let count = records.len();
    let actor = newest.actor_name.as_deref();
    let subject = newest
        .subject_name
        .as_deref()
        .or(newest.subject_id.as_deref());

    let (display_title, display_body) = match newest.kind {
        NotificationKind::Message if count == 1 => (
            Phrases::render(&phrases.message_one, actor, subject, count),
            newest.body.clone(),
        ),
        NotificationKind::Message => {
            let title = Phrases::render(&phrases.message_many, actor, subject, count);
            (title.clone(), title)
        }
        NotificationKind::ChatroomMessage if count == 1 => (
            Phrases::render(&phrases.chatroom_one, actor, subject, count),
            newest.body.clone(),
        ),
        NotificationKind::ChatroomMessage => {
            let title = Phrases::render(&phrases.chatroom_many, actor, subject, count);
            (title.clone(), title)
        }
        NotificationKind::Comment if count == 1 => (
            Phrases::render(&phrases.comment_one, actor, subject, count),
            newest.body.clone(),
        ),
        NotificationKind::Comment => {
            let title = Phrases::render(&phrases.comment_many, actor, subject, count);
            (title.clone(), title)
        }
        // Invitations keep the actor + target room phrasing at any
        // cardinality; the secondary dedup predicate makes >1 rare.
        NotificationKind::Invitation => {
            let title = Phrases::render(&phrases.invitation, actor, subject, count);
            let body = if count == 1 && !newest.body.is_empty() {
                newest.body.clone()
            } else {
                title.clone()
            };
            (title, body)
        }
        // Singleton kinds show their own strings.
        _ => (newest.title.clone(), newest.body.clone()),
    };

    let has_unread = records.iter().any(|r| !r.read);
    NotificationGroup {
        group_key,
        records,
        display_title,
        display_body,
        has_unread,
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(id: &str, kind: NotificationKind, minutes_ago: i64) -> NotificationRecord {
        NotificationRecord {
            id: id.into(),
            kind,
            title: format!("title-{id}"),
            body: format!("body-{id}"),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            read: false,
            actor_name: Some("Alex".into()),
            subject_id: None,
            subject_name: None,
            payload: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_mentions_have_no_group_key() {
        let r = record("mention-1", NotificationKind::Mention, 0);
        assert_eq!(group_key(&r), None);
    }

    #[test]
    fn test_message_key_falls_back_to_actor() {
        let r = record("pm-1", NotificationKind::Message, 0);
        assert_eq!(group_key(&r).unwrap(), "message-Alex");

        let mut with_subject = record("pm-2", NotificationKind::Message, 0);
        with_subject.subject_id = Some("u9".into());
        assert_eq!(group_key(&with_subject).unwrap(), "message-u9");
    }

    #[test]
    fn test_keyless_chatroom_message_is_singleton() {
        // No room id to group on: one group per record.
        let r = record("n1", NotificationKind::ChatroomMessage, 0);
        assert_eq!(group_key(&r).unwrap(), "other-n1");
    }

    #[test]
    fn test_cardinality_phrasing() {
        let phrases = Phrases::default();
        let mut a = record("n1", NotificationKind::ChatroomMessage, 2);
        let mut b = record("n2", NotificationKind::ChatroomMessage, 1);
        let mut c = record("n3", NotificationKind::ChatroomMessage, 0);
        for r in [&mut a, &mut b, &mut c] {
            r.subject_id = Some("r1".into());
            r.subject_name = Some("general".into());
        }

        let singles = build_groups([&a].into_iter(), &phrases);
        assert_eq!(singles[0].display_title, "New message from Alex in 'general'");
        assert_eq!(singles[0].display_body, "body-n1");

        let groups = build_groups([&a, &b, &c].into_iter(), &phrases);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0].display_title, "3 new messages in 'general'");
        // Collapsed groups lose the per-item preview.
        assert_eq!(groups[0].display_body, groups[0].display_title);
        // Members newest-first.
        assert_eq!(groups[0].records[0].id, "n3");
    }

    #[test]
    fn test_invitation_phrasing_ignores_cardinality() {
        let phrases = Phrases::default();
        let mut inv = record("invitation-r1-1", NotificationKind::Invitation, 0);
        inv.subject_id = Some("r1".into());
        inv.subject_name = Some("rust-help".into());
        inv.body = String::new();
        let groups = build_groups([&inv].into_iter(), &phrases);
        assert_eq!(groups[0].display_title, "Alex invited you to 'rust-help'");
    }

    #[test]
    fn test_has_unread_reflects_members() {
        let phrases = Phrases::default();
        let mut a = record("n1", NotificationKind::Comment, 1);
        let mut b = record("n2", NotificationKind::Comment, 0);
        a.subject_id = Some("post-1".into());
        b.subject_id = Some("post-1".into());
        a.read = true;
        b.read = true;
        let groups = build_groups([&a, &b].into_iter(), &phrases);
        assert!(!groups[0].has_unread);
    }
}
