//! Idempotent schema bootstrap for the quote store.
//!
//! `qh init` creates the categories and quotes tables plus lookup indexes.
//! Every statement is `IF NOT EXISTS`, so re-running init is safe. All
//! other commands check for the schema first and fail with a clear error
//! when it is missing.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::StoreError;

pub async fn init_schema(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT UNIQUE NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            icon TEXT NOT NULL DEFAULT '📖',
            quote_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quotes (
            id TEXT PRIMARY KEY,
            category_id TEXT NOT NULL,
            text TEXT NOT NULL,
            author TEXT NOT NULL DEFAULT 'Unknown',
            tags TEXT,
            source TEXT,
            dedup_key TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_quotes_category ON quotes(category_id)")
        .execute(&pool)
        .await?;

    // Lookup index for dedup-key scans. Deliberately NOT unique: the
    // pipeline tolerates pre-existing duplicates, it just never grows them.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_quotes_dedup ON quotes(category_id, dedup_key)",
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}

/// Verify the schema exists before touching it.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    let present: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'quotes'",
    )
    .fetch_one(pool)
    .await?;

    if present {
        Ok(())
    } else {
        Err(StoreError::SchemaMissing)
    }
}
