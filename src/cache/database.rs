use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::debug;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS ghostie(
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    repo TEXT NOT NULL,
    subject TEXT NOT NULL,
    kind TEXT NOT NULL,
    url TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ghostie_updated_at ON ghostie(updated_at)";

const DROP_TABLE: &str = "DROP TABLE IF EXISTS ghostie";

pub(crate) fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create cache directory {:?}", parent))?;
    }

    let connection = Connection::open(path)
        .with_context(|| format!("Failed to open notification cache {:?}", path))?;
    // The daemon writes while `view` reads; wait instead of failing on a locked database.
    connection
        .busy_timeout(std::time::Duration::from_secs(5))
        .context("Failed to configure cache busy timeout")?;
    Ok(connection)
}

pub(crate) fn migrate_up(connection: &Connection) -> Result<()> {
    debug!("migrating notification cache up");
    connection
        .execute(CREATE_TABLE, ())
        .context("Failed to create the notification table")?;
    connection
        .execute(CREATE_INDEX, ())
        .context("Failed to create the notification index")?;
    Ok(())
}

pub(crate) fn migrate_down(connection: &Connection) -> Result<()> {
    debug!("migrating notification cache down");
    connection
        .execute(DROP_TABLE, ())
        .context("Failed to drop the notification table")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_exists(connection: &Connection) -> bool {
        connection
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'ghostie'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            == 1
    }

    #[test]
    fn migrations_are_idempotent() {
        let temp = TempDir::new().unwrap();
        let connection = open(&temp.path().join("db/notifications.db")).unwrap();

        migrate_up(&connection).unwrap();
        migrate_up(&connection).unwrap();
        assert!(table_exists(&connection));

        migrate_down(&connection).unwrap();
        migrate_down(&connection).unwrap();
        assert!(!table_exists(&connection));
    }
}
