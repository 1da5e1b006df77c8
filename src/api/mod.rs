pub mod http_client;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::app::Result;
use crate::domain::{parse_timestamp, ActivityId};

pub use http_client::HttpApi;

/// Author fields used by the repair job. Absent when the feed was requested
/// with trimmed users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusUser {
    pub name: String,
    pub followers_count: u64,
}

/// A single post as returned by the remote API.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(rename = "id_str", deserialize_with = "de_id")]
    pub id: ActivityId,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub user: Option<StatusUser>,
}

impl Status {
    pub fn followers(&self) -> u64 {
        self.user.as_ref().map(|u| u.followers_count).unwrap_or(0)
    }

    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("")
    }
}

pub(crate) fn de_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<ActivityId, D::Error> {
    let s = String::deserialize(d)?;
    s.parse().map_err(serde::de::Error::custom)
}

pub(crate) fn de_timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(d)?;
    parse_timestamp(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}")))
}

/// The remote social-network API.
///
/// Implementations must report an exhausted call budget as
/// [`EbbError::RateLimited`](crate::app::EbbError::RateLimited) and a missing or
/// blocked target as [`EbbError::Inaccessible`](crate::app::EbbError::Inaccessible).
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Own timeline, newest first, limited to ids `<= max_id` when given.
    async fn user_timeline(&self, max_id: Option<ActivityId>, count: u32) -> Result<Vec<Status>>;
    /// Items the account likes, newest first, limited to ids `<= max_id` when given.
    async fn favorites(&self, max_id: Option<ActivityId>, count: u32) -> Result<Vec<Status>>;
    async fn show_status(&self, id: ActivityId) -> Result<Status>;
    async fn create_favorite(&self, id: ActivityId) -> Result<()>;
    async fn destroy_favorite(&self, id: ActivityId) -> Result<()>;
    async fn destroy_status(&self, id: ActivityId) -> Result<()>;
}
