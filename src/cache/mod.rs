//! SQLite backed store of notifications that have not been opened yet.

mod database;
mod notification;

pub use notification::{html_url, Notification};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT id, name, repo, subject, kind, url, updated_at FROM ghostie";

pub struct Cache {
    connection: Connection,
}

impl Cache {
    /// Open the cache at `path`, creating the database and table when needed.
    pub fn open(path: &Path) -> Result<Self> {
        let connection = database::open(path)?;
        database::migrate_up(&connection)?;
        Ok(Self { connection })
    }

    /// Drop every cached notification together with the table, then start fresh.
    pub fn destroy(path: &Path) -> Result<Self> {
        let connection = database::open(path)?;
        database::migrate_down(&connection)?;
        database::migrate_up(&connection)?;
        Ok(Self { connection })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
        Ok(Notification {
            id: row.get(0)?,
            name: row.get(1)?,
            repo: row.get(2)?,
            subject: row.get(3)?,
            kind: row.get(4)?,
            url: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// All cached notifications, most recently updated first.
    pub fn read_all(&self) -> Result<Vec<Notification>> {
        let mut statement = self
            .connection
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY updated_at DESC, id ASC"))
            .context("Failed to prepare notification query")?;
        let rows = statement
            .query_map([], Self::from_row)
            .context("Failed to query notifications")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to decode cached notification")
    }

    pub fn read_by_id(&self, id: &str) -> Result<Option<Notification>> {
        self.connection
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = :id"),
                named_params! { ":id": id },
                Self::from_row,
            )
            .optional()
            .with_context(|| format!("Failed to read notification '{id}'"))
    }

    pub fn ids(&self) -> Result<HashSet<String>> {
        let mut statement = self
            .connection
            .prepare("SELECT id FROM ghostie")
            .context("Failed to prepare id query")?;
        let rows = statement
            .query_map([], |row| row.get::<_, String>(0))
            .context("Failed to query notification ids")?;

        rows.collect::<rusqlite::Result<HashSet<_>>>()
            .context("Failed to decode notification id")
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .connection
            .query_row("SELECT count(*) FROM ghostie", [], |row| row.get(0))
            .context("Failed to count notifications")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Insert or replace one notification.
    pub fn write(&self, notification: &Notification) -> Result<()> {
        insert(&self.connection, notification)
            .map(|_| ())
            .with_context(|| format!("Failed to write notification '{}'", notification.id))
    }

    /// Write every notification in a single transaction.
    pub fn write_batch(&mut self, notifications: &[Notification]) -> Result<()> {
        let transaction = self
            .connection
            .transaction()
            .context("Failed to start cache transaction")?;
        for notification in notifications {
            insert(&transaction, notification)
                .with_context(|| format!("Failed to write notification '{}'", notification.id))?;
        }
        transaction
            .commit()
            .context("Failed to commit cache transaction")
    }

    /// Returns whether a row was removed.
    pub fn delete_by_id(&self, id: &str) -> Result<bool> {
        let removed = self
            .connection
            .execute(
                "DELETE FROM ghostie WHERE id = :id",
                named_params! { ":id": id },
            )
            .with_context(|| format!("Failed to delete notification '{id}'"))?;
        Ok(removed > 0)
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.connection
            .execute("DELETE FROM ghostie", [])
            .context("Failed to delete cached notifications")
    }

    /// Delete notifications last updated strictly before `timestamp`.
    pub fn delete_all_before(&self, timestamp: DateTime<Utc>) -> Result<usize> {
        self.connection
            .execute(
                "DELETE FROM ghostie WHERE updated_at < :timestamp",
                named_params! { ":timestamp": timestamp },
            )
            .context("Failed to prune cached notifications")
    }
}

fn insert(connection: &Connection, notification: &Notification) -> rusqlite::Result<usize> {
    connection.execute(
        "INSERT OR REPLACE INTO ghostie (id, name, repo, subject, kind, url, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &notification.id,
            &notification.name,
            &notification.repo,
            &notification.subject,
            &notification.kind,
            &notification.url,
            &notification.updated_at,
        ),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    pub(crate) fn a_notification(id: &str, updated_at: DateTime<Utc>) -> Notification {
        Notification {
            id: id.to_string(),
            name: "octo/hello".to_string(),
            repo: "hello".to_string(),
            kind: "PullRequest".to_string(),
            subject: "I need review".to_string(),
            url: "https://github.com/octo/hello/pull/1".to_string(),
            updated_at,
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 11, 21, 10, 59, 42).unwrap()
    }

    fn temp_cache() -> (TempDir, Cache) {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(&temp.path().join("notifications.db")).unwrap();
        (temp, cache)
    }

    #[test]
    fn write_and_read() {
        let (_temp, cache) = temp_cache();
        let notification = a_notification("12", fixed_time());
        cache.write(&notification).unwrap();

        assert_eq!(cache.read_by_id("12").unwrap(), Some(notification));
        assert_eq!(cache.read_by_id("13").unwrap(), None);
    }

    #[test]
    fn write_replaces_existing_id() {
        let (_temp, cache) = temp_cache();
        cache.write(&a_notification("12", fixed_time())).unwrap();
        let mut updated = a_notification("12", fixed_time() + Duration::hours(1));
        updated.subject = "Changes requested".to_string();
        cache.write(&updated).unwrap();

        assert_eq!(cache.count().unwrap(), 1);
        assert_eq!(cache.read_by_id("12").unwrap().unwrap().subject, "Changes requested");
    }

    #[test]
    fn write_and_delete() {
        let (_temp, cache) = temp_cache();
        cache.write(&a_notification("12", fixed_time())).unwrap();

        assert!(cache.delete_by_id("12").unwrap());
        assert!(!cache.delete_by_id("12").unwrap());
        assert!(cache.read_by_id("12").unwrap().is_none());
    }

    #[test]
    fn batch_write_and_read_newest_first() {
        let (_temp, mut cache) = temp_cache();
        let batch: Vec<Notification> = (0..5)
            .map(|i| a_notification(&format!("id-{i}"), fixed_time() + Duration::minutes(i)))
            .collect();
        cache.write_batch(&batch).unwrap();

        let notifications = cache.read_all().unwrap();
        assert_eq!(notifications.len(), 5);
        assert_eq!(notifications[0].id, "id-4");
        assert_eq!(notifications[4].id, "id-0");
        assert_eq!(cache.ids().unwrap().len(), 5);
    }

    #[test]
    fn delete_all_before_keeps_newer() {
        let (_temp, mut cache) = temp_cache();
        cache
            .write_batch(&[
                a_notification("old", fixed_time() - Duration::days(10)),
                a_notification("edge", fixed_time()),
                a_notification("new", fixed_time() + Duration::days(1)),
            ])
            .unwrap();

        let removed = cache.delete_all_before(fixed_time()).unwrap();
        assert_eq!(removed, 1);
        let ids = cache.ids().unwrap();
        assert!(ids.contains("edge"));
        assert!(ids.contains("new"));
        assert!(!ids.contains("old"));
    }

    #[test]
    fn delete_all_empties_cache() {
        let (_temp, mut cache) = temp_cache();
        cache
            .write_batch(&[
                a_notification("a", fixed_time()),
                a_notification("b", fixed_time()),
            ])
            .unwrap();

        assert_eq!(cache.delete_all().unwrap(), 2);
        assert_eq!(cache.count().unwrap(), 0);
    }

    #[test]
    fn destroy_drops_existing_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notifications.db");
        Cache::open(&path)
            .unwrap()
            .write(&a_notification("12", fixed_time()))
            .unwrap();

        let cache = Cache::destroy(&path).unwrap();
        assert_eq!(cache.count().unwrap(), 0);
    }

    #[test]
    fn reopen_keeps_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notifications.db");
        Cache::open(&path)
            .unwrap()
            .write(&a_notification("12", fixed_time()))
            .unwrap();

        assert_eq!(Cache::open(&path).unwrap().count().unwrap(), 1);
    }
}
