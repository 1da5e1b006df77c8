//! Offline account export.
//!
//! An extracted archive holds `tweet.js` (or `tweets.js`) and `like.js`, each a
//! JavaScript assignment such as `window.YTD.tweet.part0 = [ ... ]` wrapping a
//! JSON array.

pub mod importer;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::{de_id, de_timestamp};
use crate::app::{EbbError, Result};
use crate::domain::ActivityId;

pub use importer::{import_archive, ImportReport};

const POST_FILES: &[&str] = &["tweet.js", "tweets.js"];
const LIKE_FILES: &[&str] = &["like.js"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchivedPost {
    #[serde(rename = "id_str", deserialize_with = "de_id")]
    pub id: ActivityId,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A like carries no timestamp, only the id of the liked item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchivedLike {
    #[serde(rename = "tweetId", deserialize_with = "de_id")]
    pub id: ActivityId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostEntry {
    Wrapped { tweet: ArchivedPost },
    Bare(ArchivedPost),
}

#[derive(Deserialize)]
struct LikeEntry {
    like: ArchivedLike,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveExport {
    pub posts: Vec<ArchivedPost>,
    pub likes: Vec<ArchivedLike>,
}

impl ArchiveExport {
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let posts: Vec<PostEntry> = parse_js(&find_file(dir, POST_FILES)?)?;
        let likes: Vec<LikeEntry> = parse_js(&find_file(dir, LIKE_FILES)?)?;

        Ok(Self {
            posts: posts
                .into_iter()
                .map(|entry| match entry {
                    PostEntry::Wrapped { tweet } => tweet,
                    PostEntry::Bare(post) => post,
                })
                .collect(),
            likes: likes.into_iter().map(|entry| entry.like).collect(),
        })
    }
}

fn find_file(dir: &Path, candidates: &[&str]) -> Result<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            EbbError::Archive(format!(
                "{} not found in {}",
                candidates.join(" or "),
                dir.display()
            ))
        })
}

fn parse_js<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    let start = content.find('[').ok_or_else(|| {
        EbbError::Archive(format!("{} does not contain a JSON array", path.display()))
    })?;
    Ok(serde_json::from_str(&content[start..])?)
}
