//! Repair of likes the export records but the live API does not show.
//!
//! Clearing such a like takes a favorite followed by an unfavorite. Authors
//! below the follower threshold are left alone, since the round trip shows
//! up in their notifications.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::api::SocialApi;
use crate::app::Result;
use crate::domain::ActivityId;
use crate::store::Store;

#[derive(Debug, Clone, Copy)]
pub struct RepairOptions {
    pub min_followers: u64,
    /// Rows with a lower id are not considered.
    pub start_id: ActivityId,
    pub cutoff: DateTime<Utc>,
    pub pacing: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub examined: usize,
    pub repaired: usize,
    pub skipped: usize,
    pub flagged: usize,
    pub failed: usize,
}

enum Outcome {
    Repaired,
    BelowThreshold,
}

pub async fn repair_broken_likes<S: Store + ?Sized>(
    store: &S,
    api: &dyn SocialApi,
    options: &RepairOptions,
) -> Result<RepairReport> {
    let likes = store.broken_likes(options.cutoff, options.start_id)?;
    info!(
        count = likes.len(),
        min_followers = options.min_followers,
        start_id = options.start_id,
        "Repairing likes"
    );

    let mut report = RepairReport::default();

    for like in likes {
        report.examined += 1;

        match repair_one(api, like.id, options.min_followers).await {
            Ok(Outcome::Repaired) => {
                report.repaired += 1;
                if let Err(e) = store.delete_item(like.id) {
                    error!(id = like.id, "Error removing from database: {}", e);
                }
            }
            Ok(Outcome::BelowThreshold) => report.skipped += 1,
            Err(e) if e.is_rate_limit() => {
                warn!(id = like.id, repaired = report.repaired, "{}. Stopping.", e);
                return Err(e);
            }
            Err(e) if e.is_inaccessible() => {
                warn!(id = like.id, "Error repairing like: {}", e);
                match store.mark_errored(like.id) {
                    Ok(()) => report.flagged += 1,
                    Err(db_err) => error!(id = like.id, "Failed to flag in database: {}", db_err),
                }
            }
            Err(e) => {
                warn!(id = like.id, "Error repairing like: {}", e);
                report.failed += 1;
            }
        }

        tokio::time::sleep(options.pacing).await;
    }

    info!(
        repaired = report.repaired,
        skipped = report.skipped,
        "Unliked broken likes"
    );
    Ok(report)
}

async fn repair_one(api: &dyn SocialApi, id: ActivityId, min_followers: u64) -> Result<Outcome> {
    let status = api.show_status(id).await?;
    let followers = status.followers();

    if followers < min_followers {
        info!(
            id,
            author = status.author(),
            followers,
            "Below the follower threshold, skipping"
        );
        return Ok(Outcome::BelowThreshold);
    }

    api.create_favorite(id).await?;
    if let Err(e) = api.destroy_favorite(id).await {
        warn!(id, "Liked but failed to unlike; the item is currently liked");
        return Err(e);
    }

    info!(id, author = status.author(), followers, "Liked and unliked");
    Ok(Outcome::Repaired)
}
