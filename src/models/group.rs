use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::NotificationRecord;

/// A computed, non-persistent collapsing of related records for display.
///
/// Groups are recomputed from the live record set on every projection
/// request; they are never stored and carry no state of their own.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationGroup {
    /// The aggregation key all members share, e.g. `chatroom-{room_id}`.
    pub group_key: String,
    /// Members, newest-first. Never empty.
    pub records: Vec<NotificationRecord>,
    pub display_title: String,
    pub display_body: String,
    /// True if any member is unread.
    pub has_unread: bool,
}

impl NotificationGroup {
    /// Representative timestamp for outer ordering: the newest member's.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.records
            .first()
            .map(|r| r.created_at)
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The value handed to the presentation layer: aggregated groups first,
/// then mention singletons, plus the badge counter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Projection {
    pub aggregated: Vec<NotificationGroup>,
    /// Mentions are never merged into any group; each renders on its own.
    pub mentions: Vec<NotificationRecord>,
    /// Count of individual unread records across both partitions — not
    /// unread groups. One group of five unread messages contributes five.
    pub unread_count: usize,
}
