//! Incremental sync of new posts and likes from the remote API.
//!
//! Both feeds are paged newest first. Paging stops at an empty page or at the
//! first item whose id is not above the newest id already stored for that
//! kind, so a repeated sync with no new activity inserts nothing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::api::{SocialApi, Status};
use crate::app::Result;
use crate::domain::{ActivityId, ActivityItem, ActivityKind};
use crate::store::Store;

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub page_size: u32,
    pub pacing: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            pacing: Duration::from_secs(1),
        }
    }
}

pub async fn sync_posts<S: Store + ?Sized>(
    store: &S,
    api: &dyn SocialApi,
    options: SyncOptions,
) -> Result<usize> {
    let count = sync_feed(
        store,
        ActivityKind::Post,
        options,
        move |max_id| api.user_timeline(max_id, options.page_size),
        |status| ActivityItem::post(status.id, status.created_at),
    )
    .await?;

    info!(count, "Added new posts");
    Ok(count)
}

/// Likes carry no timestamp of their own; discovery time stands in for it.
pub async fn sync_likes<S: Store + ?Sized>(
    store: &S,
    api: &dyn SocialApi,
    options: SyncOptions,
) -> Result<usize> {
    sync_likes_at(store, api, options, Utc::now()).await
}

async fn sync_likes_at<S: Store + ?Sized>(
    store: &S,
    api: &dyn SocialApi,
    options: SyncOptions,
    discovered_at: DateTime<Utc>,
) -> Result<usize> {
    let count = sync_feed(
        store,
        ActivityKind::Like,
        options,
        move |max_id| api.favorites(max_id, options.page_size),
        |status| ActivityItem::like(status.id, discovered_at, status.favorited),
    )
    .await?;

    info!(count, "Added new likes");
    Ok(count)
}

async fn sync_feed<S, F, Fut, M>(
    store: &S,
    kind: ActivityKind,
    options: SyncOptions,
    mut fetch_page: F,
    to_item: M,
) -> Result<usize>
where
    S: Store + ?Sized,
    F: FnMut(Option<ActivityId>) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<Status>>>,
    M: Fn(&Status) -> ActivityItem,
{
    let known = store.latest_id(kind)?.unwrap_or(0);
    let mut max_id: Option<ActivityId> = None;
    let mut count = 0;

    loop {
        debug!(kind = kind.label(), ?max_id, "Loading page");
        let page = fetch_page(max_id).await?;

        let Some(last) = page.last() else {
            break;
        };
        let next_max_id = last.id - 1;

        let mut caught_up = false;
        for status in &page {
            if status.id <= known {
                caught_up = true;
                break;
            }

            match store.add_item(&to_item(status)) {
                Ok(true) => {
                    debug!(id = status.id, kind = kind.label(), "Added to database");
                    count += 1;
                }
                Ok(false) => {}
                Err(e) => error!(id = status.id, "Failed to store {}: {}", kind.label(), e),
            }
        }

        if caught_up {
            break;
        }

        max_id = Some(next_max_id);
        tokio::time::sleep(options.pacing).await;
    }

    Ok(count)
}
