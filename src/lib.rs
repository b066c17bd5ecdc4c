//! notify-center — notification aggregation and deduplication engine.
//!
//! Merges notifications from two unordered, possibly-overlapping sources
//! (a live push channel and a periodic full-snapshot pull), deduplicates
//! them by derived identity, collapses related records into display
//! groups, and tracks read state per record. The embedding UI feeds raw
//! events in and renders the [`models::Projection`] that comes out;
//! everything else (REST calls, toasts, sounds, rendering) lives with the
//! host.

pub mod config;
pub mod engine;
pub mod errors;
pub mod models;

pub use config::{EngineConfig, Phrases};
pub use engine::{EngineCommand, EngineHandle, NotificationCenter, PullEntry, PushEvent};
pub use errors::NormalizeError;
pub use models::{NotificationGroup, NotificationKind, NotificationRecord, Projection};
