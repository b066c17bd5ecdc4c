//! Identity & deduplication index — the live, in-memory record set.
//!
//! All mutation in the engine flows through this type, serialized by the
//! host's single event-loop task. Every operation is a silent no-op when
//! its target is absent: network races (a delete landing after the item
//! already left by another path) are expected and must not crash the UI.

use std::collections::{HashSet, VecDeque};

use crate::models::NotificationRecord;

/// What `insert` did with a record, so the host can log suppressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same derived id is already present.
    DuplicateId,
    /// Invitation/friend-request secondary predicate: an unread record of
    /// the same kind already covers this subject.
    DuplicateSubject,
}

/// Live record set with idempotent insertion. Newest records sit at the
/// front so default iteration favors recency.
#[derive(Debug, Default)]
pub struct NotificationIndex {
    records: VecDeque<NotificationRecord>,
    ids: HashSet<String>,
    max_records: Option<usize>,
}

impl NotificationIndex {
    pub fn new(max_records: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            ids: HashSet::new(),
            max_records,
        }
    }

    /// Idempotent insert. Exact id collisions are no-ops; for invitations
    /// and friend requests an existing *unread* record of the same kind
    /// and subject also suppresses the insertion, which is how a pushed
    /// invitation and its later snapshot copy collapse to one entry.
    pub fn insert(&mut self, record: NotificationRecord) -> InsertOutcome {
        if self.ids.contains(&record.id) {
            return InsertOutcome::DuplicateId;
        }
        if record.kind.dedups_by_subject() && record.subject_id.is_some() {
            let covered = self.records.iter().any(|r| {
                r.kind == record.kind && !r.read && r.subject_id == record.subject_id
            });
            if covered {
                return InsertOutcome::DuplicateSubject;
            }
        }

        self.ids.insert(record.id.clone());
        self.records.push_front(record);
        if let Some(cap) = self.max_records {
            while self.records.len() > cap {
                if let Some(evicted) = self.records.pop_back() {
                    self.ids.remove(&evicted.id);
                }
            }
        }
        InsertOutcome::Inserted
    }

    /// Delete by id. No-op if absent.
    pub fn remove(&mut self, id: &str) {
        if self.ids.remove(id) {
            self.records.retain(|r| r.id != id);
        }
    }

    /// Mark one record read. No-op if absent. Returns whether anything
    /// changed so callers can skip republishing an identical projection.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(r) if !r.read => {
                r.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for r in &mut self.records {
            r.read = true;
        }
    }

    /// Borrowed view of the live records, newest first. Mutation goes
    /// through the operations above, never through this view.
    pub fn all(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────
