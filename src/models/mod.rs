pub mod group;
pub mod record;

pub use group::{NotificationGroup, Projection};
pub use record::{NotificationKind, NotificationRecord};
