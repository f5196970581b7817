//! The load coordinator: fans out across the configured category sources,
//! streams records through normalization and deduplication, and commits
//! accepted quotes per category in a single transaction.
//!
//! One source's failure never aborts the run; it is recorded in the load
//! report and the remaining categories proceed. Only structural
//! misconfiguration (duplicate slugs, an unopenable store) propagates as
//! an error.

use anyhow::Result;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{Config, FetchConfig};
use crate::dedup::{self, Deduplicator};
use crate::fetch::SourceClient;
use crate::models::CanonicalRecord;
use crate::normalize::{self, dedup_key};
use crate::registry::{self, SourceBinding};
use crate::resolver::{self, CategoryMeta};
use crate::{db, schema};

/// Per-run overrides supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct IngestOverrides {
    /// Restrict the run to these category names (case-insensitive).
    pub categories: Vec<String>,
    pub max_quotes: Option<usize>,
    pub timeout_secs: Option<u64>,
    /// Process only the first N bindings.
    pub limit_sources: Option<usize>,
    /// Fetch, normalize, and deduplicate, but skip the commit.
    pub dry_run: bool,
}

/// Terminal state of one category's processing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "status", content = "error")]
pub enum CategoryStatus {
    Done,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub name: String,
    pub fetched: usize,
    pub accepted: usize,
    pub skipped: usize,
    #[serde(flatten)]
    pub status: CategoryStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Totals {
    pub fetched: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// The sole output contract of a load run: per-category outcomes plus
/// aggregate totals. The run always completes and returns a full report;
/// the caller decides whether partial success is acceptable.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub dry_run: bool,
    pub categories: Vec<CategoryReport>,
    pub totals: Totals,
}

impl LoadReport {
    fn new(categories: Vec<CategoryReport>, dry_run: bool) -> Self {
        let mut totals = Totals::default();
        for c in &categories {
            totals.fetched += c.fetched;
            totals.accepted += c.accepted;
            totals.skipped += c.skipped;
            match c.status {
                CategoryStatus::Failed(_) => totals.failed += 1,
                CategoryStatus::Cancelled => totals.cancelled += 1,
                CategoryStatus::Done => {}
            }
        }
        Self {
            dry_run,
            categories,
            totals,
        }
    }
}

/// CLI entry point: wire Ctrl-C to cancellation, run the pipeline, and
/// print the report. Partial failures are part of the report, not an
/// error, so the exit code stays zero.
pub async fn run_ingest(config: &Config, overrides: IngestOverrides, json: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("cancellation requested; finishing in-flight categories");
                cancel.cancel();
            }
        });
    }

    let report = run_pipeline(config, &overrides, cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Execute one full load run and return its report.
pub async fn run_pipeline(
    config: &Config,
    overrides: &IngestOverrides,
    cancel: CancellationToken,
) -> Result<LoadReport> {
    let mut bindings = registry::resolve_bindings(config)?;

    if !overrides.categories.is_empty() {
        let wanted: Vec<String> = overrides
            .categories
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        bindings.retain(|b| wanted.contains(&b.name.to_lowercase()));
    }
    if let Some(limit) = overrides.limit_sources {
        bindings.truncate(limit);
    }

    let mut fetch = config.fetch.clone();
    if let Some(n) = overrides.max_quotes {
        fetch.max_quotes = n;
    }
    if let Some(secs) = overrides.timeout_secs {
        fetch.timeout_secs = secs;
    }

    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;

    let concurrency = fetch.concurrency.max(1);
    let dry_run = overrides.dry_run;

    let mut outcomes: Vec<(usize, CategoryReport)> =
        stream::iter(bindings.into_iter().enumerate())
            .map(|(idx, binding)| {
                let pool = pool.clone();
                let fetch = fetch.clone();
                let cancel = cancel.clone();
                async move {
                    let report = process_category(&pool, &fetch, &binding, dry_run, &cancel).await;
                    (idx, report)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

    // Present the report in registry order regardless of completion order.
    outcomes.sort_by_key(|(idx, _)| *idx);
    let report = LoadReport::new(outcomes.into_iter().map(|(_, r)| r).collect(), dry_run);

    pool.close().await;
    Ok(report)
}

/// `Fetching → Normalizing → Deduplicating → Committing → Done`, with
/// `Failed` reachable from the fetch and commit steps. Normalization and
/// deduplication are total and never fail.
async fn process_category(
    pool: &SqlitePool,
    fetch: &FetchConfig,
    binding: &SourceBinding,
    dry_run: bool,
    cancel: &CancellationToken,
) -> CategoryReport {
    let report = |fetched, accepted, skipped, status| CategoryReport {
        name: binding.name.clone(),
        fetched,
        accepted,
        skipped,
        status,
    };

    if cancel.is_cancelled() {
        return report(0, 0, 0, CategoryStatus::Cancelled);
    }

    // Fetching
    let base_url = binding.base_url.as_deref().unwrap_or(&fetch.base_url);
    let client = match SourceClient::new(fetch, base_url, binding.label.as_deref()) {
        Ok(c) => c,
        Err(e) => return report(0, 0, 0, CategoryStatus::Failed(e.to_string())),
    };
    let raws = match client.fetch(&binding.tag).await {
        Ok(records) => records,
        Err(e) => {
            warn!(category = %binding.name, error = %e, "source fetch failed");
            return report(0, 0, 0, CategoryStatus::Failed(e.to_string()));
        }
    };
    let fetched = raws.len();

    // Deduplication is seeded from durable state so a re-run against a
    // populated store accepts nothing it has seen before.
    let existing = match dedup::existing_keys(pool, &binding.name).await {
        Ok(keys) => keys,
        Err(e) => {
            error!(category = %binding.name, error = %e, "dedup seed lookup failed");
            return report(fetched, 0, 0, CategoryStatus::Failed(e.to_string()));
        }
    };
    let mut deduplicator = Deduplicator::new(existing);

    // Normalizing + Deduplicating
    let mut skipped = 0usize;
    let mut staged: Vec<CanonicalRecord> = Vec::new();
    for raw in raws {
        match normalize::normalize(raw) {
            None => skipped += 1,
            Some(record) => {
                if deduplicator.is_novel(&record) {
                    staged.push(record);
                } else {
                    skipped += 1;
                }
            }
        }
    }
    let accepted = staged.len();

    // A category row is only created once at least one quote is accepted;
    // a failed or empty source leaves no noise category behind.
    if dry_run || staged.is_empty() {
        info!(
            category = %binding.name,
            fetched, accepted, skipped, dry_run,
            "category processed without commit"
        );
        return report(fetched, accepted, skipped, CategoryStatus::Done);
    }

    // Committing
    let meta = CategoryMeta {
        name: &binding.name,
        slug: &binding.slug,
        description: &binding.description,
        icon: &binding.icon,
    };
    let category = match resolver::resolve(pool, &meta).await {
        Ok(c) => c,
        Err(e) => {
            error!(category = %binding.name, error = %e, "category resolution failed");
            return report(fetched, 0, accepted + skipped, CategoryStatus::Failed(e.to_string()));
        }
    };

    if let Err(e) = commit_quotes(pool, &category.id, &staged).await {
        error!(category = %binding.name, error = %e, "commit failed");
        return report(fetched, 0, accepted + skipped, CategoryStatus::Failed(e.to_string()));
    }

    info!(category = %binding.name, fetched, accepted, skipped, "category loaded");
    report(fetched, accepted, skipped, CategoryStatus::Done)
}

/// Insert the staged quotes and recompute the category's quote count from
/// the actual row count, atomically. A committed category is never
/// observed with a stale count.
async fn commit_quotes(
    pool: &SqlitePool,
    category_id: &str,
    staged: &[CanonicalRecord],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let now = Utc::now().timestamp();

    for record in staged {
        let tags = if record.tags.is_empty() {
            None
        } else {
            Some(record.tags.join(","))
        };
        sqlx::query(
            r#"
            INSERT INTO quotes (id, category_id, text, author, tags, source, dedup_key, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(category_id)
        .bind(&record.text)
        .bind(&record.author)
        .bind(tags)
        .bind(&record.source)
        .bind(dedup_key(&record.text, &record.author))
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        UPDATE categories
        SET quote_count = (SELECT COUNT(*) FROM quotes WHERE category_id = ?)
        WHERE id = ?
        "#,
    )
    .bind(category_id)
    .bind(category_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Human-readable report, one block per category then totals.
pub fn print_report(report: &LoadReport) {
    println!(
        "ingest{}",
        if report.dry_run { " (dry-run)" } else { "" }
    );
    for c in &report.categories {
        match &c.status {
            CategoryStatus::Done => println!(
                "  {:<14} fetched: {:<5} accepted: {:<5} skipped: {:<5} done",
                c.name, c.fetched, c.accepted, c.skipped
            ),
            CategoryStatus::Failed(err) => println!("  {:<14} FAILED: {}", c.name, err),
            CategoryStatus::Cancelled => println!("  {:<14} cancelled", c.name),
        }
    }
    println!(
        "  totals: fetched {} / accepted {} / skipped {} / failed {} / cancelled {}",
        report.totals.fetched,
        report.totals.accepted,
        report.totals.skipped,
        report.totals.failed,
        report.totals.cancelled
    );
    if report.totals.failed == 0 && report.totals.cancelled == 0 {
        println!("ok");
    }
}
