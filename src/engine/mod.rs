pub mod center;
pub mod group;
pub mod index;
pub mod normalize;
pub mod project;

pub use center::{EngineCommand, EngineHandle, NotificationCenter};
pub use index::{InsertOutcome, NotificationIndex};
pub use normalize::{normalize_pull, normalize_push, PullEntry, PushEvent};
pub use project::project;
