//! NotificationCenter — the single-threaded owner of the index, plus the
//! async host loop that serializes both event sources onto one task.
//!
//! The center itself is synchronous and pure state: the two inbound
//! sources (live push channel, periodic snapshot pull) and the UI's
//! read/delete actions all funnel into it as [`EngineCommand`]s over one
//! mpsc channel, so there is never concurrent mutation. Because insertion
//! is idempotent and keyed deterministically, any interleaving of push
//! and pull ingestion converges to the same record set.

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::models::Projection;

use super::group::group_key;
use super::index::{InsertOutcome, NotificationIndex};
use super::normalize::{normalize_pull, normalize_push, PullEntry, PushEvent};
use super::project::project;

pub struct NotificationCenter {
    index: NotificationIndex,
    config: EngineConfig,
}

impl NotificationCenter {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            index: NotificationIndex::new(config.max_records),
            config,
        }
    }

    /// Ingest a named push-channel event. Malformed or unrecognized
    /// payloads are logged and dropped; returns whether a record landed.
    pub fn ingest_push_named(&mut self, name: &str, payload: Value) -> bool {
        match PushEvent::from_named(name, payload) {
            Ok(event) => self.ingest_push(event),
            Err(e) => {
                warn!("dropping push event: {e}");
                false
            }
        }
    }

    /// Ingest an already-decoded push event.
    pub fn ingest_push(&mut self, event: PushEvent) -> bool {
        match normalize_push(event, Utc::now()) {
            Ok(record) => self.insert_logged(record),
            Err(e) => {
                debug!("dropping push event: {e}");
                false
            }
        }
    }

    /// Ingest a full pull snapshot. Entries already known (by id or by the
    /// invitation/friend-request subject predicate) are absorbed silently.
    /// Returns how many new records landed.
    pub fn ingest_snapshot(&mut self, entries: Vec<PullEntry>) -> usize {
        let arrival = Utc::now();
        let mut inserted = 0;
        for entry in entries {
            match normalize_pull(entry, arrival) {
                Ok(record) => {
                    if self.insert_logged(record) {
                        inserted += 1;
                    }
                }
                Err(e) => debug!("dropping snapshot entry: {e}"),
            }
        }
        inserted
    }

    fn insert_logged(&mut self, record: crate::models::NotificationRecord) -> bool {
        let id = record.id.clone();
        match self.index.insert(record) {
            InsertOutcome::Inserted => true,
            InsertOutcome::DuplicateId => {
                debug!("duplicate notification id {id}, suppressed");
                false
            }
            InsertOutcome::DuplicateSubject => {
                debug!("notification {id} already covered by an unread record, suppressed");
                false
            }
        }
    }

    pub fn mark_read(&mut self, id: &str) {
        self.index.mark_read(id);
    }

    /// Mark every current member of a group read. Group read state is
    /// nothing but the members' flags; there is no separate group flag.
    pub fn mark_group_read(&mut self, key: &str) {
        let members: Vec<String> = self
            .index
            .all()
            .filter(|r| group_key(r).as_deref() == Some(key))
            .map(|r| r.id.clone())
            .collect();
        for id in members {
            self.index.mark_read(&id);
        }
    }

    pub fn mark_all_read(&mut self) {
        self.index.mark_all_read();
    }

    pub fn remove(&mut self, id: &str) {
        self.index.remove(id);
    }

    /// Recompute the presentation view from the current record set.
    pub fn projection(&self) -> Projection {
        project(&self.index, &self.config.phrases)
    }
}

// ── Async host ───────────────────────────────────────────────

/// One mutation or ingestion request for the engine loop.
#[derive(Debug)]
pub enum EngineCommand {
    /// A named event from the push transport with its raw payload.
    Push { name: String, payload: Value },
    /// A full snapshot from the REST notification list.
    Snapshot(Vec<PullEntry>),
    MarkRead(String),
    MarkGroupRead(String),
    MarkAllRead,
    Remove(String),
    Shutdown,
}

/// Clonable front door to a spawned engine loop. Dropping every handle
/// closes the command channel and ends the loop — no ambient globals,
/// teardown is deterministic.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<EngineCommand>,
    projection: watch::Receiver<Projection>,
}

impl EngineHandle {
    pub fn send(&self, cmd: EngineCommand) -> anyhow::Result<()> {
        self.tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("notification engine is shut down"))
    }

    pub fn push(&self, name: impl Into<String>, payload: Value) -> anyhow::Result<()> {
        self.send(EngineCommand::Push {
            name: name.into(),
            payload,
        })
    }

    pub fn snapshot(&self, entries: Vec<PullEntry>) -> anyhow::Result<()> {
        self.send(EngineCommand::Snapshot(entries))
    }

    pub fn mark_read(&self, id: impl Into<String>) -> anyhow::Result<()> {
        self.send(EngineCommand::MarkRead(id.into()))
    }

    pub fn mark_group_read(&self, key: impl Into<String>) -> anyhow::Result<()> {
        self.send(EngineCommand::MarkGroupRead(key.into()))
    }

    pub fn mark_all_read(&self) -> anyhow::Result<()> {
        self.send(EngineCommand::MarkAllRead)
    }

    pub fn remove(&self, id: impl Into<String>) -> anyhow::Result<()> {
        self.send(EngineCommand::Remove(id.into()))
    }

    pub fn shutdown(&self) -> anyhow::Result<()> {
        self.send(EngineCommand::Shutdown)
    }

    /// Subscribe to projection updates. Each subscriber owns its receiver;
    /// dropping it is the unsubscribe.
    pub fn subscribe(&self) -> watch::Receiver<Projection> {
        self.projection.clone()
    }

    /// The most recently published projection.
    pub fn latest(&self) -> Projection {
        self.projection.borrow().clone()
    }
}

impl NotificationCenter {
    /// Spawn the engine loop on the current tokio runtime. All mutation is
    /// serialized through the returned handle's command channel; every
    /// mutating command publishes a freshly recomputed projection.
    pub fn spawn(config: EngineConfig) -> (EngineHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (proj_tx, proj_rx) = watch::channel(Projection::default());
        let mut center = NotificationCenter::new(config);

        let task = tokio::spawn(async move {
            info!("notification engine started");
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    EngineCommand::Push { name, payload } => {
                        center.ingest_push_named(&name, payload);
                    }
                    EngineCommand::Snapshot(entries) => {
                        center.ingest_snapshot(entries);
                    }
                    EngineCommand::MarkRead(id) => center.mark_read(&id),
                    EngineCommand::MarkGroupRead(key) => center.mark_group_read(&key),
                    EngineCommand::MarkAllRead => center.mark_all_read(),
                    EngineCommand::Remove(id) => center.remove(&id),
                    EngineCommand::Shutdown => break,
                }
                // Subscribers may all be gone; that's fine, keep serving
                // the remaining command senders.
                let _ = proj_tx.send(center.projection());
            }
            info!("notification engine stopped");
        });

        (
            EngineHandle {
                tx,
                projection: proj_rx,
            },
            task,
        )
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_push_is_dropped_not_fatal() {
        let mut center = NotificationCenter::new(EngineConfig::default());
        assert!(!center.ingest_push_named("no such event", json!({})));
        assert!(!center.ingest_push_named("new private message", json!({"message_id": "m1"})));
        assert_eq!(center.projection().unread_count, 0);
    }

    #[test]
    fn test_mark_group_read_only_touches_members() {
        let mut center = NotificationCenter::new(EngineConfig::default());
        center.ingest_push_named(
            "new private message",
            json!({"message_id": "m1", "sender_name": "Alex"}),
        );
        center.ingest_push_named(
            "new private message",
            json!({"message_id": "m2", "sender_name": "Sam"}),
        );
        center.mark_group_read("message-Alex");
        let view = center.projection();
        assert_eq!(view.unread_count, 1);
        let sam = view
            .aggregated
            .iter()
            .find(|g| g.group_key == "message-Sam")
            .unwrap();
        assert!(sam.has_unread);
    }
}
