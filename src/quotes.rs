//! Manual quote administration: add, sample, clear.
//!
//! `add-quote` goes through the same normalizer and deduplicator as the
//! pipeline, so a manually added duplicate is rejected the same way a
//! fetched one is.

use anyhow::{bail, Result};
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use crate::config::Config;
use crate::dedup::{self, Deduplicator};
use crate::models::{RawRecord, TagField};
use crate::normalize::{self, dedup_key};
use crate::{db, resolver, schema};

/// Provenance label for manually added quotes.
const MANUAL_SOURCE: &str = "Manual";

pub async fn run_add_quote(
    config: &Config,
    category_slug: &str,
    text: &str,
    author: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let category = match resolver::find_by_slug(&pool, category_slug).await? {
        Some(c) => c,
        None => {
            pool.close().await;
            bail!("category '{}' not found", category_slug);
        }
    };

    let raw = RawRecord {
        content: Some(text.to_string()),
        author,
        tags: tags.map(TagField::Joined),
        source: Some(MANUAL_SOURCE.to_string()),
    };
    let record = match normalize::normalize(raw) {
        Some(r) => r,
        None => {
            pool.close().await;
            bail!("quote text is empty");
        }
    };

    let existing = dedup::existing_keys(&pool, &category.name).await?;
    let mut deduplicator = Deduplicator::new(existing);
    if !deduplicator.is_novel(&record) {
        println!("duplicate quote — nothing added");
        pool.close().await;
        return Ok(());
    }

    let tags_joined = if record.tags.is_empty() {
        None
    } else {
        Some(record.tags.join(","))
    };

    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO quotes (id, category_id, text, author, tags, source, dedup_key, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&category.id)
    .bind(&record.text)
    .bind(&record.author)
    .bind(tags_joined)
    .bind(&record.source)
    .bind(dedup_key(&record.text, &record.author))
    .bind(Utc::now().timestamp())
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE categories SET quote_count = (SELECT COUNT(*) FROM quotes WHERE category_id = ?) WHERE id = ?",
    )
    .bind(&category.id)
    .bind(&category.id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    println!("added quote to {}", category.name);

    pool.close().await;
    Ok(())
}

/// Print a handful of random stored quotes.
pub async fn run_sample(config: &Config, limit: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let rows = sqlx::query(
        r#"
        SELECT q.text, q.author, c.name AS category
        FROM quotes q
        JOIN categories c ON c.id = q.category_id
        ORDER BY RANDOM()
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        println!("No quotes found");
        pool.close().await;
        return Ok(());
    }

    for (i, row) in rows.iter().enumerate() {
        println!();
        println!("{}. \"{}\"", i + 1, row.get::<String, _>("text"));
        println!("   — {}", row.get::<String, _>("author"));
        println!("   category: {}", row.get::<String, _>("category"));
    }

    pool.close().await;
    Ok(())
}

/// Delete all quotes and categories. Requires the explicit `--yes` flag.
pub async fn run_clear(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        bail!("this deletes all quotes and categories; pass --yes to confirm");
    }

    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM quotes").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM categories")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    println!("cleared");

    pool.close().await;
    Ok(())
}
