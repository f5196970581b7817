//! Category listing and manual category administration.

use anyhow::{bail, Result};
use sqlx::Row;

use crate::config::Config;
use crate::resolver::{self, CategoryMeta};
use crate::{db, schema};

/// List categories from the store.
pub async fn run_categories(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let rows = sqlx::query(
        "SELECT name, slug, icon, quote_count FROM categories ORDER BY name ASC",
    )
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        println!("No categories found");
        pool.close().await;
        return Ok(());
    }

    println!("{:<3} {:<18} {:<18} QUOTES", "", "NAME", "SLUG");
    for row in &rows {
        println!(
            "{:<3} {:<18} {:<18} {}",
            row.get::<String, _>("icon"),
            row.get::<String, _>("name"),
            row.get::<String, _>("slug"),
            row.get::<i64, _>("quote_count"),
        );
    }

    pool.close().await;
    Ok(())
}

/// Manually create a category through the same resolver the pipeline
/// uses. Refuses to touch an existing slug.
pub async fn run_add_category(
    config: &Config,
    name: &str,
    slug: Option<String>,
    description: Option<String>,
    icon: Option<String>,
) -> Result<()> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let slug = slug.unwrap_or_else(|| name.to_lowercase());

    if resolver::find_by_slug(&pool, &slug).await?.is_some() {
        pool.close().await;
        bail!("category slug '{}' already exists", slug);
    }
    if resolver::find_by_name(&pool, name).await?.is_some() {
        pool.close().await;
        bail!("category '{}' already exists", name);
    }

    let meta = CategoryMeta {
        name,
        slug: &slug,
        description: description.as_deref().unwrap_or(""),
        icon: icon.as_deref().unwrap_or("📖"),
    };
    let category = resolver::resolve(&pool, &meta).await?;
    println!("added category {} ({})", category.name, category.slug);

    pool.close().await;
    Ok(())
}
