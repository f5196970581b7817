//! Category resolution: map a category name to its persistent identity,
//! creating it on first sight.
//!
//! Create-if-absent leans on the store's unique constraint on name with a
//! re-read on conflict, so two concurrent workers can never create two
//! categories for one name. Existing metadata is never overwritten, even
//! when the hints differ.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::Category;

/// Metadata used when a category has to be created.
#[derive(Debug, Clone)]
pub struct CategoryMeta<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub icon: &'a str,
}

pub async fn resolve(pool: &SqlitePool, meta: &CategoryMeta<'_>) -> Result<Category, StoreError> {
    if let Some(existing) = find_by_name(pool, meta.name).await? {
        return Ok(existing);
    }

    let insert = sqlx::query(
        r#"
        INSERT INTO categories (id, name, slug, description, icon, quote_count, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(meta.name)
    .bind(meta.slug)
    .bind(meta.description)
    .bind(meta.icon)
    .bind(Utc::now().timestamp())
    .execute(pool)
    .await;

    match insert {
        Ok(_) => {}
        // Slug uniqueness backstop: a different name already owns this slug.
        Err(sqlx::Error::Database(db)) if db.message().contains("categories.slug") => {
            return Err(StoreError::SlugTaken(meta.slug.to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    // Re-read covers both our own insert and a concurrent winner's.
    find_by_name(pool, meta.name)
        .await?
        .ok_or_else(|| StoreError::Db(sqlx::Error::RowNotFound))
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Category>, StoreError> {
    let row = sqlx::query(
        "SELECT id, name, slug, description, icon, quote_count, created_at FROM categories WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(category_from_row))
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Category>, StoreError> {
    let row = sqlx::query(
        "SELECT id, name, slug, description, icon, quote_count, created_at FROM categories WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(category_from_row))
}

fn category_from_row(row: sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        icon: row.get("icon"),
        quote_count: row.get("quote_count"),
        created_at: row.get("created_at"),
    }
}
