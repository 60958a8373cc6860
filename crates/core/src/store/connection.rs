//! Opening the site database.

use std::path::Path;

use tokio_rusqlite::Connection;

use super::migrations;
use crate::Error;

/// WAL keeps sitemap reads from blocking CLI writes on the same file.
const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA busy_timeout=5000;
     PRAGMA foreign_keys=ON;";

/// Handle to the site database: settings records and posts.
///
/// Queries run on the tokio-rusqlite background thread. Clones share the
/// same connection.
#[derive(Clone, Debug)]
pub struct SiteDb {
    pub(crate) conn: Connection,
}

impl SiteDb {
    /// Open (or create) the database file, creating missing parent directories,
    /// and bring the schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::InvalidInput(format!("cannot create {}: {e}", parent.display())))?;
        }
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        let db = Self::init(conn).await?;
        tracing::debug!(path = %path.display(), "site database ready");
        Ok(db)
    }

    /// Fresh in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| conn.execute_batch(PRAGMAS)).await.map_err(Error::Database)?;
        migrations::run(&conn).await?;
        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = SiteDb::open_in_memory().await.unwrap();
        let foreign_keys: i64 = db
            .conn
            .call(|conn| conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("newsmap-open-{}", std::process::id()));
        let path = dir.join("nested").join("site.sqlite");

        let db = SiteDb::open(&path).await.unwrap();
        drop(db);
        assert!(path.exists());

        let reopened = SiteDb::open(&path).await;
        assert!(reopened.is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
