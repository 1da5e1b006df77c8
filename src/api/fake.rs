use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::api::{SocialApi, Status, StatusUser};
use crate::app::{EbbError, Result};
use crate::domain::ActivityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Timeline(Option<ActivityId>),
    Favorites(Option<ActivityId>),
    Show(ActivityId),
    CreateFavorite(ActivityId),
    DestroyFavorite(ActivityId),
    DestroyStatus(ActivityId),
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    RateLimited,
    Inaccessible,
    Transient,
}

impl Failure {
    fn into_error(self, endpoint: &str, id: ActivityId) -> EbbError {
        match self {
            Self::RateLimited => EbbError::RateLimited {
                endpoint: endpoint.to_string(),
            },
            Self::Inaccessible => EbbError::Inaccessible {
                id,
                reason: "No status found with that ID.".into(),
            },
            Self::Transient => EbbError::Api {
                status: 503,
                message: "Over capacity".into(),
            },
        }
    }
}

/// In-memory stand-in for the remote API that records every call.
#[derive(Default)]
pub struct FakeApi {
    timeline: Vec<Status>,
    favorites: Vec<Status>,
    statuses: HashMap<ActivityId, Status>,
    failures: Mutex<HashMap<(&'static str, ActivityId), Failure>>,
    /// Remaining calls before every call is rate limited.
    budget: Mutex<Option<usize>>,
    calls: Mutex<Vec<Call>>,
}

pub fn status(id: ActivityId, created_at: DateTime<Utc>) -> Status {
    Status {
        id,
        created_at,
        favorited: false,
        user: None,
    }
}

pub fn status_by(id: ActivityId, created_at: DateTime<Utc>, followers: u64) -> Status {
    Status {
        user: Some(StatusUser {
            name: format!("author-{id}"),
            followers_count: followers,
        }),
        ..status(id, created_at)
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline entries; stored newest first regardless of input order.
    pub fn with_timeline(mut self, mut statuses: Vec<Status>) -> Self {
        statuses.sort_by(|a, b| b.id.cmp(&a.id));
        self.timeline = statuses;
        self
    }

    pub fn with_favorites(mut self, mut statuses: Vec<Status>) -> Self {
        for status in &mut statuses {
            status.favorited = true;
        }
        statuses.sort_by(|a, b| b.id.cmp(&a.id));
        self.favorites = statuses;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.statuses.insert(status.id, status);
        self
    }

    /// Make `endpoint` ("show", "create", "destroy_favorite", "destroy_status")
    /// fail for `id`.
    pub fn fail(self, endpoint: &'static str, id: ActivityId, failure: Failure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((endpoint, id), failure);
        self
    }

    pub fn with_budget(self, calls: usize) -> Self {
        *self.budget.lock().unwrap() = Some(calls);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call, endpoint: &'static str, id: ActivityId) -> Result<()> {
        self.calls.lock().unwrap().push(call);

        let mut budget = self.budget.lock().unwrap();
        if let Some(remaining) = budget.as_mut() {
            if *remaining == 0 {
                return Err(Failure::RateLimited.into_error(endpoint, id));
            }
            *remaining -= 1;
        }

        match self.failures.lock().unwrap().get(&(endpoint, id)) {
            Some(failure) => Err(failure.into_error(endpoint, id)),
            None => Ok(()),
        }
    }

    fn page(feed: &[Status], max_id: Option<ActivityId>, count: u32) -> Vec<Status> {
        feed.iter()
            .filter(|s| max_id.map_or(true, |max| s.id <= max))
            .take(count as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SocialApi for FakeApi {
    async fn user_timeline(&self, max_id: Option<ActivityId>, count: u32) -> Result<Vec<Status>> {
        self.record(Call::Timeline(max_id), "timeline", 0)?;
        Ok(Self::page(&self.timeline, max_id, count))
    }

    async fn favorites(&self, max_id: Option<ActivityId>, count: u32) -> Result<Vec<Status>> {
        self.record(Call::Favorites(max_id), "favorites", 0)?;
        Ok(Self::page(&self.favorites, max_id, count))
    }

    async fn show_status(&self, id: ActivityId) -> Result<Status> {
        self.record(Call::Show(id), "show", id)?;
        self.statuses
            .get(&id)
            .cloned()
            .ok_or_else(|| Failure::Inaccessible.into_error("show", id))
    }

    async fn create_favorite(&self, id: ActivityId) -> Result<()> {
        self.record(Call::CreateFavorite(id), "create", id)
    }

    async fn destroy_favorite(&self, id: ActivityId) -> Result<()> {
        self.record(Call::DestroyFavorite(id), "destroy_favorite", id)
    }

    async fn destroy_status(&self, id: ActivityId) -> Result<()> {
        self.record(Call::DestroyStatus(id), "destroy_status", id)
    }
}
