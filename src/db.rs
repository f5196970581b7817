use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;

/// Writer contention between category transactions shows up as
/// SQLITE_BUSY; the busy timeout lets a commit wait its turn instead.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    // One connection per concurrent category worker plus one for the
    // coordinator's own reads.
    let workers = config.fetch.concurrency.max(1) as u32;
    let pool = SqlitePoolOptions::new()
        .max_connections(workers + 1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
