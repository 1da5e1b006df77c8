use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::SocialApi;
use crate::app::Result;
use crate::archive::ArchiveExport;
use crate::domain::ActivityItem;
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub posts: usize,
    pub likes: usize,
    pub skipped: usize,
}

/// Seed an empty store from an offline export.
///
/// Returns `None` without touching the API when the store already holds rows,
/// unless `resume` is set. A resumed import re-inserts posts (duplicates are
/// ignored) and looks up only the likes that are not stored yet, so an import
/// cut short by the call budget can be finished later.
///
/// Likes have no timestamp in the export, so each liked item is looked up to
/// borrow its creation time and current favorited flag. Lookups that fail are
/// logged and skipped; an exhausted call budget stops the import.
pub async fn import_archive<S: Store + ?Sized>(
    store: &S,
    api: &dyn SocialApi,
    export: &ArchiveExport,
    pacing: Duration,
    resume: bool,
) -> Result<Option<ImportReport>> {
    if !resume && !store.is_empty()? {
        debug!("Store is not empty, skipping archive import");
        return Ok(None);
    }

    let mut report = ImportReport::default();

    info!(count = export.posts.len(), resume, "Importing archived posts");
    for post in &export.posts {
        match store.add_item(&ActivityItem::post(post.id, post.created_at)) {
            Ok(true) => {
                debug!(id = post.id, "Post added");
                report.posts += 1;
            }
            Ok(false) => {}
            Err(e) => error!(id = post.id, "Failed to store post: {}", e),
        }
    }

    info!(count = export.likes.len(), "Importing archived likes");
    for like in &export.likes {
        if resume && store.get_item(like.id)?.is_some() {
            continue;
        }

        match api.show_status(like.id).await {
            Ok(status) => {
                let item = ActivityItem::like(like.id, status.created_at, status.favorited);
                match store.add_item(&item) {
                    Ok(true) => {
                        debug!(id = like.id, favorited = status.favorited, "Like added");
                        report.likes += 1;
                    }
                    Ok(false) => {}
                    Err(e) => error!(id = like.id, "Failed to store like: {}", e),
                }
            }
            Err(e) if e.is_rate_limit() => {
                warn!(
                    id = like.id,
                    posts = report.posts,
                    likes = report.likes,
                    "{}. Stopping import.",
                    e
                );
                return Err(e);
            }
            Err(e) => {
                warn!(id = like.id, "Error retrieving liked item: {}", e);
                report.skipped += 1;
            }
        }

        tokio::time::sleep(pacing).await;
    }

    info!(
        posts = report.posts,
        likes = report.likes,
        skipped = report.skipped,
        "Archive import complete"
    );
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{status, Call, FakeApi, Failure};
    use crate::archive::{ArchivedLike, ArchivedPost};
    use crate::domain::{Activity, ActivityId};
    use crate::store::SqliteStore;
    use chrono::{Duration as ChronoDuration, Utc};

    fn export() -> ArchiveExport {
        let then = Utc::now() - ChronoDuration::days(400);
        ArchiveExport {
            posts: vec![
                ArchivedPost { id: 1, created_at: then },
                ArchivedPost { id: 2, created_at: then },
            ],
            likes: vec![
                ArchivedLike { id: 10 },
                ArchivedLike { id: 11 },
                ArchivedLike { id: 12 },
            ],
        }
    }

    #[tokio::test]
    async fn test_import_into_empty_store() {
        let store = SqliteStore::in_memory().unwrap();
        let liked_at = Utc::now() - ChronoDuration::days(200);
        let mut favorited = status(10, liked_at);
        favorited.favorited = true;
        let api = FakeApi::new()
            .with_status(favorited)
            .with_status(status(11, liked_at))
            .fail("show", 12, Failure::Transient);

        let report = import_archive(&store, &api, &export(), Duration::ZERO, false)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            report,
            ImportReport {
                posts: 2,
                likes: 2,
                skipped: 1,
            }
        );

        let like = store.get_item(10).unwrap().unwrap();
        assert_eq!(like.activity, Activity::Like { favorited: true });
        assert_eq!(like.created_at.timestamp(), liked_at.timestamp());
        assert_eq!(
            store.get_item(11).unwrap().unwrap().activity,
            Activity::Like { favorited: false }
        );
        assert!(store.get_item(12).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_skipped_when_store_not_empty() {
        let store = SqliteStore::in_memory().unwrap();
        store.add_item(&ActivityItem::post(99, Utc::now())).unwrap();
        let api = FakeApi::new();

        let report = import_archive(&store, &api, &export(), Duration::ZERO, false)
            .await
            .unwrap();

        assert!(report.is_none());
        assert!(api.calls().is_empty());
        assert!(store.get_item(1).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_looks_up_each_like_once() {
        let store = SqliteStore::in_memory().unwrap();
        let api = FakeApi::new();

        import_archive(&store, &api, &export(), Duration::ZERO, false)
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::Show(10), Call::Show(11), Call::Show(12)]
        );
    }

    fn export_with_likes(ids: std::ops::RangeInclusive<ActivityId>) -> ArchiveExport {
        ArchiveExport {
            posts: vec![ArchivedPost {
                id: 1,
                created_at: Utc::now() - ChronoDuration::days(400),
            }],
            likes: ids.map(|id| ArchivedLike { id }).collect(),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_stops_import() {
        let store = SqliteStore::in_memory().unwrap();
        let api = FakeApi::new()
            .with_status(status(10, Utc::now()))
            .with_status(status(11, Utc::now()))
            .with_budget(2);

        let err = import_archive(&store, &api, &export_with_likes(10..=19), Duration::ZERO, false)
            .await
            .unwrap_err();

        assert!(err.is_rate_limit());
        // The third lookup hit the limit; nothing after it was attempted.
        assert_eq!(api.calls().len(), 3);
        assert!(store.get_item(11).unwrap().is_some());
        assert!(store.get_item(12).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_finishes_interrupted_import() {
        let store = SqliteStore::in_memory().unwrap();
        let export = export_with_likes(10..=19);
        let mut api = FakeApi::new();
        for id in 10..=19 {
            api = api.with_status(status(id, Utc::now()));
        }
        let limited = api.with_budget(2);
        import_archive(&store, &limited, &export, Duration::ZERO, false)
            .await
            .unwrap_err();

        // A plain import refuses a non-empty store.
        let fresh = FakeApi::new();
        assert!(import_archive(&store, &fresh, &export, Duration::ZERO, false)
            .await
            .unwrap()
            .is_none());

        let mut api = FakeApi::new();
        for id in 10..=19 {
            api = api.with_status(status(id, Utc::now()));
        }
        let report = import_archive(&store, &api, &export, Duration::ZERO, true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            report,
            ImportReport {
                posts: 0,
                likes: 8,
                skipped: 0,
            }
        );
        // Likes already stored are not looked up again.
        assert_eq!(api.count(|c| matches!(c, Call::Show(10) | Call::Show(11))), 0);
        for id in 10..=19 {
            assert!(store.get_item(id).unwrap().is_some());
        }
    }
}
