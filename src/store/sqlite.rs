use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{EbbError, Result};
use crate::domain::{Activity, ActivityId, ActivityItem, ActivityKind, ItemStatus};
use crate::store::{Store, StoreSummary};

const ITEM_COLUMNS: &str = "id, created_at, kind, favorited, error";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            EbbError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    /// Fixed-width UTC text, so `created_at < ?` compares chronologically.
    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ActivityItem> {
        let kind_code: i64 = row.get(2)?;
        let kind = ActivityKind::from_code(kind_code)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, kind_code))?;

        let activity = match kind {
            ActivityKind::Post => Activity::Post,
            ActivityKind::Like => Activity::Like {
                favorited: row.get::<_, Option<bool>>(3)?.unwrap_or(false),
            },
        };

        let status = match row.get::<_, Option<i64>>(4)? {
            Some(flag) if flag != 0 => ItemStatus::Errored,
            _ => ItemStatus::Active,
        };

        let raw: String = row.get(1)?;
        let created_at = Self::parse_datetime(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("invalid created_at: {raw}").into(),
            )
        })?;

        Ok(ActivityItem {
            id: row.get(0)?,
            created_at,
            activity,
            status,
        })
    }

    fn select_items<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<ActivityItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;

        let items = stmt
            .query_map(params, Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }
}

impl Store for SqliteStore {
    fn is_empty(&self) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool =
            conn.query_row("SELECT EXISTS(SELECT 1 FROM activity)", [], |row| row.get(0))?;
        Ok(!exists)
    }

    fn add_item(&self, item: &ActivityItem) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let error = match item.status {
            ItemStatus::Errored => Some(1),
            ItemStatus::Active => None,
        };
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO activity (id, created_at, kind, favorited, error)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.id,
                Self::format_datetime(&item.created_at),
                item.kind().code(),
                item.activity.favorited(),
                error
            ],
        )?;

        tx.commit()?;
        Ok(inserted > 0)
    }

    fn get_item(&self, id: ActivityId) -> Result<Option<ActivityItem>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM activity WHERE id = ?1"),
                params![id],
                Self::row_to_item,
            )
            .optional()?;

        Ok(result)
    }

    fn latest_id(&self, kind: ActivityKind) -> Result<Option<ActivityId>> {
        let conn = self.conn()?;

        let id = conn.query_row(
            "SELECT MAX(id) FROM activity WHERE kind = ?1",
            params![kind.code()],
            |row| row.get::<_, Option<ActivityId>>(0),
        )?;

        Ok(id)
    }

    fn posts_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<ActivityItem>> {
        self.select_items(
            &format!(
                "SELECT {ITEM_COLUMNS} FROM activity
                 WHERE kind = 0 AND error IS NULL AND created_at < ?1
                 ORDER BY id"
            ),
            params![Self::format_datetime(&cutoff)],
        )
    }

    fn likes_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<ActivityItem>> {
        self.select_items(
            &format!(
                "SELECT {ITEM_COLUMNS} FROM activity
                 WHERE kind = 1 AND favorited = 1 AND error IS NULL AND created_at < ?1
                 ORDER BY id"
            ),
            params![Self::format_datetime(&cutoff)],
        )
    }

    fn broken_likes(
        &self,
        cutoff: DateTime<Utc>,
        from_id: ActivityId,
    ) -> Result<Vec<ActivityItem>> {
        self.select_items(
            &format!(
                "SELECT {ITEM_COLUMNS} FROM activity
                 WHERE kind = 1 AND favorited = 0 AND error IS NULL
                   AND id >= ?2 AND created_at < ?1
                 ORDER BY id"
            ),
            params![Self::format_datetime(&cutoff), from_id],
        )
    }

    fn mark_errored(&self, id: ActivityId) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("UPDATE activity SET error = 1 WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    fn delete_item(&self, id: ActivityId) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM activity WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn summary(&self, cutoff: DateTime<Utc>) -> Result<StoreSummary> {
        let conn = self.conn()?;

        let summary = conn.query_row(
            "SELECT
                COALESCE(SUM(kind = 0), 0),
                COALESCE(SUM(kind = 1), 0),
                COALESCE(SUM(error IS NOT NULL), 0),
                COALESCE(SUM(kind = 0 AND error IS NULL AND created_at < ?1), 0),
                COALESCE(SUM(kind = 1 AND favorited = 1 AND error IS NULL AND created_at < ?1), 0),
                COALESCE(SUM(kind = 1 AND favorited = 0 AND error IS NULL AND created_at < ?1), 0)
             FROM activity",
            params![Self::format_datetime(&cutoff)],
            |row| {
                Ok(StoreSummary {
                    posts: row.get(0)?,
                    likes: row.get(1)?,
                    errored: row.get(2)?,
                    posts_due: row.get(3)?,
                    likes_due: row.get(4)?,
                    broken_likes: row.get(5)?,
                })
            },
        )?;

        Ok(summary)
    }
}
