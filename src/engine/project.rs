//! Ordering & projection — the pure recompute that turns the live record
//! set into the structure the presentation layer renders.

use crate::config::Phrases;
use crate::models::{NotificationRecord, Projection};

use super::group::build_groups;
use super::index::NotificationIndex;

/// Build the presentation view: aggregable groups first (newest-first by
/// their newest member), then mention singletons (newest-first). Never
/// mutates the index.
pub fn project(index: &NotificationIndex, phrases: &Phrases) -> Projection {
    let mut mentions: Vec<NotificationRecord> = index
        .all()
        .filter(|r| r.kind == crate::models::NotificationKind::Mention)
        .cloned()
        .collect();
    mentions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut aggregated = build_groups(
        index
            .all()
            .filter(|r| r.kind != crate::models::NotificationKind::Mention),
        phrases,
    );
    aggregated.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

    // Badge counter: individual unread records, not unread groups.
    let unread_count = index.all().filter(|r| !r.read).count();

    Projection {
        aggregated,
        mentions,
        unread_count,
    }
}

// ── Tests ────────────────────────────────────────────────────
