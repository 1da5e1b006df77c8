use std::path::Path;

use chrono::{DateTime, Utc};

use crate::app::{AppContext, EbbError, Result};
use crate::archive::{import_archive, ArchiveExport};
use crate::domain::ActivityId;
use crate::repair::{repair_broken_likes, RepairOptions};
use crate::retire::{retire_likes, retire_posts};
use crate::store::Store;
use crate::sync::{sync_likes, sync_posts, SyncOptions};

fn sync_options(ctx: &AppContext) -> SyncOptions {
    SyncOptions {
        page_size: ctx.config.pacing.page_size,
        pacing: ctx.config.pacing.delay(),
    }
}

fn cutoff(ctx: &AppContext) -> DateTime<Utc> {
    ctx.config.retention.window().cutoff(Utc::now())
}

/// An exhausted call budget ends the command without failing it.
fn stop_on_rate_limit(result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_rate_limit() => {
            println!("Stopped: {}. The next run resumes where this one left off.", e);
            Ok(())
        }
        other => other,
    }
}

/// Full cycle: seed an empty database, sync, then retire.
pub async fn run_cycle(ctx: &AppContext) -> Result<()> {
    stop_on_rate_limit(cycle(ctx).await)
}

async fn cycle(ctx: &AppContext) -> Result<()> {
    if ctx.store.is_empty()? {
        let path = ctx.config.archive.path.clone().ok_or_else(|| {
            EbbError::Config(
                "The database is empty. Run `ebb import <archive>` or set [archive] path first"
                    .into(),
            )
        })?;
        import_from(ctx, &path, false).await?;
    }

    sync_all(ctx).await?;
    retire_all(ctx).await
}

pub async fn import(ctx: &AppContext, path: &Path, resume: bool) -> Result<()> {
    if !resume && !ctx.store.is_empty()? {
        println!("The database already has entries, skipping import");
        return Ok(());
    }

    stop_on_rate_limit(import_from(ctx, path, resume).await)
}

async fn import_from(ctx: &AppContext, path: &Path, resume: bool) -> Result<()> {
    println!("Loading archive from {}", path.display());
    let export = ArchiveExport::from_dir(path)?;
    println!(
        "Found {} posts and {} likes",
        export.posts.len(),
        export.likes.len()
    );

    let api = ctx.api()?;
    match import_archive(
        ctx.store.as_ref(),
        api,
        &export,
        ctx.config.pacing.delay(),
        resume,
    )
    .await
    {
        Ok(Some(report)) => println!(
            "Added {} posts and {} likes to the database ({} likes skipped)",
            report.posts, report.likes, report.skipped
        ),
        Ok(None) => {}
        Err(e) if e.is_rate_limit() => {
            println!(
                "Import interrupted. Finish it with `ebb import --resume {}`",
                path.display()
            );
            return Err(e);
        }
        Err(e) => return Err(e),
    }

    Ok(())
}

pub async fn sync(ctx: &AppContext) -> Result<()> {
    stop_on_rate_limit(sync_all(ctx).await)
}

async fn sync_all(ctx: &AppContext) -> Result<()> {
    let api = ctx.api()?;
    let options = sync_options(ctx);

    let posts = sync_posts(ctx.store.as_ref(), api, options).await?;
    println!("Added {} posts to the database", posts);

    let likes = sync_likes(ctx.store.as_ref(), api, options).await?;
    println!("Added {} likes to the database", likes);

    Ok(())
}

pub async fn retire(ctx: &AppContext) -> Result<()> {
    stop_on_rate_limit(retire_all(ctx).await)
}

async fn retire_all(ctx: &AppContext) -> Result<()> {
    let api = ctx.api()?;
    let cutoff = cutoff(ctx);
    let pacing = ctx.config.pacing.delay();

    let posts = retire_posts(ctx.store.as_ref(), api, cutoff, pacing).await?;
    println!(
        "Deleted {} posts ({} inaccessible, {} failed)",
        posts.retired, posts.flagged, posts.failed
    );

    let likes = retire_likes(ctx.store.as_ref(), api, cutoff, pacing).await?;
    println!(
        "Unliked {} items ({} inaccessible, {} failed)",
        likes.retired, likes.flagged, likes.failed
    );

    Ok(())
}

pub async fn repair(
    ctx: &AppContext,
    min_followers: Option<u64>,
    start_id: ActivityId,
) -> Result<()> {
    let api = ctx.api()?;
    let options = RepairOptions {
        min_followers: min_followers.unwrap_or(ctx.config.repair.min_followers),
        start_id,
        cutoff: cutoff(ctx),
        pacing: ctx.config.pacing.delay(),
    };

    stop_on_rate_limit(
        repair_broken_likes(ctx.store.as_ref(), api, &options)
            .await
            .map(|report| {
                println!(
                    "Unliked {} items ({} below threshold, {} inaccessible, {} failed)",
                    report.repaired, report.skipped, report.flagged, report.failed
                );
            }),
    )
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let summary = ctx.store.summary(cutoff(ctx))?;

    println!("Posts:        {}", summary.posts);
    println!("Likes:        {}", summary.likes);
    println!("Inaccessible: {}", summary.errored);
    println!(
        "Past the {}-month window: {} posts, {} likes, {} likes to repair",
        ctx.config.retention.months, summary.posts_due, summary.likes_due, summary.broken_likes
    );

    Ok(())
}
