//! Versioned schema migrations.
//!
//! Applied versions are recorded in `_migrations`. Each pending migration runs
//! in its own transaction together with its bookkeeping row.

use chrono::Utc;
use tokio_rusqlite::{Connection, params, rusqlite};

use super::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "options", sql: include_str!("../../migrations/001_options.sql") },
    Migration { version: 2, name: "posts", sql: include_str!("../../migrations/002_posts.sql") },
];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn current_version(conn: &rusqlite::Connection) -> Result<i64, Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        )",
    )?;
    let version = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;
    Ok(version)
}

/// Apply every migration newer than the recorded schema version.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` naming the migration whose SQL failed, or
/// if the database was written by a newer build.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current = current_version(conn)?;
        if current > latest_version() {
            return Err(Error::MigrationFailed(format!(
                "database schema version {current} is newer than supported version {}",
                latest_version()
            )));
        }

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql)
                .map_err(|e| Error::MigrationFailed(format!("{} ({}): {e}", migration.version, migration.name)))?;
            tx.execute(
                "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, Utc::now().timestamp()],
            )?;
            tx.commit()?;
            tracing::debug!(version = migration.version, name = migration.name, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
