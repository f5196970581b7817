//! Substring search over stored quote text.
//!
//! Plain SQL `LIKE`, case-insensitive — deliberately not full-text
//! indexing or ranking.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::db;
use crate::schema;

pub async fn run_search(config: &Config, term: &str, limit: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let pattern = format!(
        "%{}%",
        term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
    );
    let rows = sqlx::query(
        r#"
        SELECT q.text, q.author, c.name AS category
        FROM quotes q
        JOIN categories c ON c.id = q.category_id
        WHERE q.text LIKE ? ESCAPE '\'
        ORDER BY c.name, q.author
        LIMIT ?
        "#,
    )
    .bind(&pattern)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        println!("No results");
        pool.close().await;
        return Ok(());
    }

    println!("{} result(s) for \"{}\"", rows.len(), term);
    for row in &rows {
        println!();
        println!("\"{}\"", row.get::<String, _>("text"));
        println!(
            "  — {}  [{}]",
            row.get::<String, _>("author"),
            row.get::<String, _>("category")
        );
    }

    pool.close().await;
    Ok(())
}
