//! Per-site option records.
//!
//! Each record is a JSON value keyed by `(site_id, name)`, the same shape a
//! CMS options table uses. Higher layers decide what the JSON means.

use super::connection::SiteDb;
use crate::Error;
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl SiteDb {
    /// Get the raw JSON value of an option.
    ///
    /// Returns None if the option is not set for the site.
    pub async fn get_option(&self, site_id: i64, name: &str) -> Result<Option<String>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT value FROM options WHERE site_id = ?1 AND name = ?2",
                    params![site_id, name],
                    |row| row.get(0),
                );

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert an option only if it is not already set.
    ///
    /// Returns true if the option was created.
    pub async fn add_option(&self, site_id: i64, name: &str, value: &str) -> Result<bool, Error> {
        let name = name.to_string();
        let value = value.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO options (site_id, name, value, updated_at) VALUES (?1, ?2, ?3, ?4)",
                    params![site_id, name, value, now],
                )?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace an option value.
    pub async fn update_option(&self, site_id: i64, name: &str, value: &str) -> Result<(), Error> {
        let name = name.to_string();
        let value = value.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO options (site_id, name, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(site_id, name) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![site_id, name, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete an option for every site.
    ///
    /// Returns the number of deleted records.
    pub async fn delete_option_all_sites(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM options WHERE name = ?1", params![name])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_option() {
        let db = SiteDb::open_in_memory().await.unwrap();
        assert!(db.get_option(1, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_option_does_not_overwrite() {
        let db = SiteDb::open_in_memory().await.unwrap();
        assert!(db.add_option(1, "opts", r#"{"a":1}"#).await.unwrap());
        assert!(!db.add_option(1, "opts", r#"{"a":2}"#).await.unwrap());
        assert_eq!(db.get_option(1, "opts").await.unwrap().as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_update_option_upserts() {
        let db = SiteDb::open_in_memory().await.unwrap();
        db.update_option(1, "opts", "1").await.unwrap();
        db.update_option(1, "opts", "2").await.unwrap();
        assert_eq!(db.get_option(1, "opts").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_options_are_per_site() {
        let db = SiteDb::open_in_memory().await.unwrap();
        db.update_option(1, "opts", "one").await.unwrap();
        db.update_option(2, "opts", "two").await.unwrap();

        assert!(!db.add_option(2, "opts", "again").await.unwrap());
        assert_eq!(db.get_option(1, "opts").await.unwrap().as_deref(), Some("one"));
        assert_eq!(db.get_option(2, "opts").await.unwrap().as_deref(), Some("two"));
        assert!(db.get_option(3, "opts").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_option_all_sites() {
        let db = SiteDb::open_in_memory().await.unwrap();
        db.update_option(1, "opts", "one").await.unwrap();
        db.update_option(2, "opts", "two").await.unwrap();
        db.update_option(2, "other", "keep").await.unwrap();

        let deleted = db.delete_option_all_sites("opts").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(db.get_option(2, "other").await.unwrap().as_deref(), Some("keep"));
    }
}
