//! # quote-harvest CLI (`qh`)
//!
//! The `qh` binary is the primary interface for quote-harvest. It provides
//! commands for store initialization, quote ingestion, search, sampling,
//! and category administration.
//!
//! ## Usage
//!
//! ```bash
//! qh --config ./config/qh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `qh init` | Create the SQLite store and its schema |
//! | `qh ingest` | Fetch, deduplicate, and load quotes from all sources |
//! | `qh sources` | List configured category→source bindings |
//! | `qh stats` | Totals plus per-category count health |
//! | `qh categories` | List categories in the store |
//! | `qh add-category` | Manually create a category |
//! | `qh add-quote` | Manually add a quote (dedup rules apply) |
//! | `qh sample` | Print random stored quotes |
//! | `qh search "<term>"` | Case-insensitive substring search |
//! | `qh clear --yes` | Delete all quotes and categories |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the store
//! qh init
//!
//! # Load everything; safe to re-run, previously seen quotes are skipped
//! qh ingest
//!
//! # Restrict a run and emit the report as JSON
//! qh ingest --category Love --category Courage --json
//!
//! # Preview without writing
//! qh ingest --dry-run
//! ```

mod categories;
mod config;
mod db;
mod dedup;
mod error;
mod fetch;
mod ingest;
mod models;
mod normalize;
mod quotes;
mod registry;
mod resolver;
mod schema;
mod search;
mod sources;
mod stats;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// quote-harvest CLI — a resilient quote ingestion pipeline over SQLite.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; a missing file simply means defaults.
#[derive(Parser)]
#[command(
    name = "qh",
    about = "quote-harvest — a resilient quote ingestion pipeline and admin CLI over SQLite",
    version,
    long_about = "quote-harvest pulls quote records from several remote category sources, \
    normalizes and deduplicates them, and loads them into a durable SQLite store under an \
    idempotent, re-runnable contract. The same store is served by a small administration CLI."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/qh.toml`. A missing file is not an error;
    /// built-in defaults apply.
    #[arg(long, global = true, default_value = "./config/qh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the store schema.
    ///
    /// Creates the SQLite database file, the categories and quotes tables,
    /// and their lookup indexes. Idempotent — running it multiple times is
    /// safe.
    Init,

    /// Fetch, deduplicate, and load quotes from all configured sources.
    ///
    /// One idempotent operation: re-running against a populated store
    /// accepts nothing it has seen before. Individual source failures are
    /// recorded in the report and do not abort the run.
    Ingest {
        /// Restrict the run to these category names (repeatable).
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Override the per-category record cap.
        #[arg(long)]
        max_quotes: Option<usize>,

        /// Override the per-request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Process only the first N configured sources.
        #[arg(long)]
        limit_sources: Option<usize>,

        /// Fetch, normalize, and deduplicate, but write nothing.
        #[arg(long)]
        dry_run: bool,

        /// Print the load report as JSON instead of the human summary.
        #[arg(long)]
        json: bool,
    },

    /// List configured category→source bindings.
    Sources,

    /// Store totals plus per-category count health.
    Stats,

    /// List categories in the store.
    Categories,

    /// Manually create a category.
    ///
    /// Goes through the same resolver as the pipeline; refuses to touch an
    /// existing slug.
    AddCategory {
        #[arg(long)]
        name: String,

        /// URL-safe slug; defaults to the lower-cased name.
        #[arg(long)]
        slug: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        icon: Option<String>,
    },

    /// Manually add a quote to a category.
    ///
    /// Normalization and deduplication apply exactly as during ingestion;
    /// a duplicate is reported, not inserted.
    AddQuote {
        /// Category slug the quote belongs to.
        #[arg(long)]
        category: String,

        #[arg(long)]
        text: String,

        #[arg(long)]
        author: Option<String>,

        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
    },

    /// Print random stored quotes.
    Sample {
        #[arg(long, default_value_t = 5)]
        limit: i64,
    },

    /// Case-insensitive substring search over quote text.
    Search {
        /// The term to search for.
        term: String,

        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Delete all quotes and categories.
    Clear {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            schema::init_schema(&cfg).await?;
            println!("Store initialized successfully.");
        }
        Commands::Ingest {
            categories,
            max_quotes,
            timeout_secs,
            limit_sources,
            dry_run,
            json,
        } => {
            let overrides = ingest::IngestOverrides {
                categories,
                max_quotes,
                timeout_secs,
                limit_sources,
                dry_run,
            };
            ingest::run_ingest(&cfg, overrides, json).await?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Categories => {
            categories::run_categories(&cfg).await?;
        }
        Commands::AddCategory {
            name,
            slug,
            description,
            icon,
        } => {
            categories::run_add_category(&cfg, &name, slug, description, icon).await?;
        }
        Commands::AddQuote {
            category,
            text,
            author,
            tags,
        } => {
            quotes::run_add_quote(&cfg, &category, &text, author, tags).await?;
        }
        Commands::Sample { limit } => {
            quotes::run_sample(&cfg, limit).await?;
        }
        Commands::Search { term, limit } => {
            search::run_search(&cfg, &term, limit).await?;
        }
        Commands::Clear { yes } => {
            quotes::run_clear(&cfg, yes).await?;
        }
    }

    Ok(())
}
