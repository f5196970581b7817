//! Cross-run deduplication keyed on content identity.
//!
//! One `Deduplicator` lives per category per run. It is seeded with the
//! dedup keys of the category's already-persisted quotes, so re-running
//! the whole pipeline against a populated store is a no-op for
//! previously-seen quotes — the idempotence contract of the system.

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::CanonicalRecord;
use crate::normalize::dedup_key;

pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new(existing: impl IntoIterator<Item = String>) -> Self {
        Self {
            seen: existing.into_iter().collect(),
        }
    }

    /// Whether this record has been seen before, either in this run or in
    /// the durable state the set was seeded with. A novel record is
    /// remembered, so overlapping upstream pages cannot sneak a duplicate
    /// in later in the same run.
    pub fn is_novel(&mut self, record: &CanonicalRecord) -> bool {
        self.seen.insert(dedup_key(&record.text, &record.author))
    }
}

/// Dedup keys of the quotes already persisted for a category name.
/// An absent category simply has no keys.
pub async fn existing_keys(pool: &SqlitePool, category_name: &str) -> Result<Vec<String>, StoreError> {
    let keys = sqlx::query_scalar(
        r#"
        SELECT q.dedup_key FROM quotes q
        JOIN categories c ON c.id = q.category_id
        WHERE c.name = ?
        "#,
    )
    .bind(category_name)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}
