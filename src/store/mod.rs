pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{ActivityId, ActivityItem, ActivityKind};

pub use sqlite::SqliteStore;

/// Row counts reported by `ebb status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub posts: i64,
    pub likes: i64,
    pub errored: i64,
    pub posts_due: i64,
    pub likes_due: i64,
    pub broken_likes: i64,
}

pub trait Store {
    fn is_empty(&self) -> Result<bool>;

    /// Returns `false` when a row with the same id already exists.
    fn add_item(&self, item: &ActivityItem) -> Result<bool>;
    fn get_item(&self, id: ActivityId) -> Result<Option<ActivityItem>>;
    fn latest_id(&self, kind: ActivityKind) -> Result<Option<ActivityId>>;

    // Retirement selections, oldest id first. Errored rows are never returned.
    fn posts_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<ActivityItem>>;
    fn likes_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<ActivityItem>>;
    fn broken_likes(&self, cutoff: DateTime<Utc>, from_id: ActivityId)
        -> Result<Vec<ActivityItem>>;

    fn mark_errored(&self, id: ActivityId) -> Result<()>;
    fn delete_item(&self, id: ActivityId) -> Result<bool>;

    fn summary(&self, cutoff: DateTime<Utc>) -> Result<StoreSummary>;
}
