pub mod activity;
pub mod retention;

pub use activity::{Activity, ActivityId, ActivityItem, ActivityKind, ItemStatus};
pub use retention::{parse_timestamp, RetentionWindow, DEFAULT_RETENTION_MONTHS};
