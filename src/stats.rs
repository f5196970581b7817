//! Store statistics and health overview.
//!
//! Gives a quick summary of what's loaded: category and quote totals plus
//! a per-category breakdown comparing the denormalized `quote_count`
//! column against the actual row count. Used by `qh stats` to give
//! confidence that loads are working as expected.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::db;
use crate::schema;

struct CategoryStats {
    name: String,
    icon: String,
    quote_count: i64,
    actual_count: i64,
}

/// Run the stats command: query the store and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let total_categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&pool)
        .await?;

    let total_quotes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
        .fetch_one(&pool)
        .await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("quote-harvest — Store Stats");
    println!("===========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Categories:  {}", total_categories);
    println!("  Quotes:      {}", total_quotes);

    let rows = sqlx::query(
        r#"
        SELECT
            c.name,
            c.icon,
            c.quote_count,
            COUNT(q.id) AS actual_count
        FROM categories c
        LEFT JOIN quotes q ON q.category_id = c.id
        GROUP BY c.id
        ORDER BY actual_count DESC, c.name ASC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let stats: Vec<CategoryStats> = rows
        .iter()
        .map(|row| CategoryStats {
            name: row.get("name"),
            icon: row.get("icon"),
            quote_count: row.get("quote_count"),
            actual_count: row.get("actual_count"),
        })
        .collect();

    if !stats.is_empty() {
        println!();
        println!("  By category:");
        println!(
            "  {:<20} {:>8} {:>8}   {}",
            "CATEGORY", "COUNT", "ACTUAL", "STATUS"
        );
        println!("  {}", "-".repeat(52));

        for s in &stats {
            let status = if s.quote_count == s.actual_count {
                "ok"
            } else {
                "COUNT DRIFT"
            };
            println!(
                "  {} {:<18} {:>8} {:>8}   {}",
                s.icon, s.name, s.quote_count, s.actual_count, status
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
