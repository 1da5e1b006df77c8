//! Retirement of posts and likes that are past the retention window.
//!
//! Each qualifying row gets exactly one remote call. A confirmed call deletes
//! the row; an inaccessible target flags the row so later sweeps skip it; any
//! other failure leaves the row for the next run. An exhausted call budget
//! ends the sweep at once with the current row untouched.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::api::SocialApi;
use crate::app::Result;
use crate::domain::{ActivityId, ActivityItem, ActivityKind};
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub attempted: usize,
    pub retired: usize,
    pub flagged: usize,
    pub failed: usize,
}

/// Delete posts created before `cutoff`.
pub async fn retire_posts<S: Store + ?Sized>(
    store: &S,
    api: &dyn SocialApi,
    cutoff: DateTime<Utc>,
    pacing: Duration,
) -> Result<SweepReport> {
    let items = store.posts_due(cutoff)?;
    info!(count = items.len(), "Retiring posts");

    let report = sweep(store, ActivityKind::Post, items, pacing, move |id| {
        api.destroy_status(id)
    })
    .await?;

    info!(
        retired = report.retired,
        flagged = report.flagged,
        failed = report.failed,
        "Deleted posts"
    );
    Ok(report)
}

/// Unlike still-favorited likes recorded before `cutoff`.
pub async fn retire_likes<S: Store + ?Sized>(
    store: &S,
    api: &dyn SocialApi,
    cutoff: DateTime<Utc>,
    pacing: Duration,
) -> Result<SweepReport> {
    let items = store.likes_due(cutoff)?;
    info!(count = items.len(), "Retiring likes");

    let report = sweep(store, ActivityKind::Like, items, pacing, move |id| {
        api.destroy_favorite(id)
    })
    .await?;

    info!(
        retired = report.retired,
        flagged = report.flagged,
        failed = report.failed,
        "Unliked items"
    );
    Ok(report)
}

async fn sweep<S, F, Fut>(
    store: &S,
    kind: ActivityKind,
    items: Vec<ActivityItem>,
    pacing: Duration,
    mut retire: F,
) -> Result<SweepReport>
where
    S: Store + ?Sized,
    F: FnMut(ActivityId) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut report = SweepReport::default();

    for item in items {
        report.attempted += 1;

        match retire(item.id).await {
            Ok(()) => {
                report.retired += 1;
                match store.delete_item(item.id) {
                    Ok(_) => info!(id = item.id, kind = kind.label(), "Retired, removed from database"),
                    Err(e) => error!(
                        id = item.id,
                        "Retired remotely but failed to remove from database: {}",
                        e
                    ),
                }
            }
            Err(e) if e.is_rate_limit() => {
                warn!(id = item.id, retired = report.retired, "{}. Stopping.", e);
                return Err(e);
            }
            Err(e) if e.is_inaccessible() => {
                warn!(id = item.id, "Error retiring {} ({})", kind.label(), e);
                match store.mark_errored(item.id) {
                    Ok(()) => report.flagged += 1,
                    Err(db_err) => error!(id = item.id, "Failed to flag in database: {}", db_err),
                }
            }
            Err(e) => {
                warn!(
                    id = item.id,
                    "Error retiring {} ({}), will retry next run",
                    kind.label(),
                    e
                );
                report.failed += 1;
            }
        }

        tokio::time::sleep(pacing).await;
    }

    Ok(report)
}
