use chrono::{DateTime, Utc};

/// Remote identifier. Ids grow with creation time, so they double as an
/// ordering key.
pub type ActivityId = i64;

/// Discriminant stored in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Post,
    Like,
}

impl ActivityKind {
    pub fn code(self) -> i64 {
        match self {
            Self::Post => 0,
            Self::Like => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Post),
            1 => Some(Self::Like),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Like => "like",
        }
    }
}

/// What a stored row refers to.
///
/// `favorited` only exists for likes: it is the remote API's view of whether
/// the like is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Post,
    Like { favorited: bool },
}

impl Activity {
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::Post => ActivityKind::Post,
            Self::Like { .. } => ActivityKind::Like,
        }
    }

    pub fn favorited(&self) -> Option<bool> {
        match self {
            Self::Post => None,
            Self::Like { favorited } => Some(*favorited),
        }
    }
}

/// Lifecycle of a stored row. A retired item has no row at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemStatus {
    #[default]
    Active,
    /// The remote API reported the item inaccessible; never retried.
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    pub id: ActivityId,
    pub created_at: DateTime<Utc>,
    pub activity: Activity,
    pub status: ItemStatus,
}

impl ActivityItem {
    pub fn post(id: ActivityId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            activity: Activity::Post,
            status: ItemStatus::Active,
        }
    }

    pub fn like(id: ActivityId, created_at: DateTime<Utc>, favorited: bool) -> Self {
        Self {
            id,
            created_at,
            activity: Activity::Like { favorited },
            status: ItemStatus::Active,
        }
    }

    pub fn kind(&self) -> ActivityKind {
        self.activity.kind()
    }

    pub fn is_errored(&self) -> bool {
        self.status == ItemStatus::Errored
    }
}
