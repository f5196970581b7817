//! # quote-harvest
//!
//! A resilient quote ingestion pipeline and admin CLI over SQLite.
//!
//! quote-harvest pulls quote records from several remote category sources,
//! normalizes and deduplicates them, and loads them into a durable SQLite
//! store under an idempotent, re-runnable contract. A thin administration
//! CLI reads and maintains the same store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌──────────┐
//! │  Sources    │──▶│    Pipeline       │──▶│  SQLite   │
//! │ HTTP (tags) │   │ Normalize+Dedup  │   │ categories│
//! └─────────────┘   └──────────────────┘   │  +quotes  │
//!                                          └────┬─────┘
//!                                               ▼
//!                                          ┌──────────┐
//!                                          │   CLI    │
//!                                          │   (qh)   │
//!                                          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! qh init                       # create the store
//! qh ingest                     # pull, dedup, and load all categories
//! qh stats                      # totals and per-category health
//! qh search "courage"           # substring search over quote text
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`registry`] | Category→source bindings |
//! | [`fetch`] | HTTP source client with retry/backoff |
//! | [`normalize`] | Record normalization and dedup keys |
//! | [`dedup`] | Cross-run deduplication |
//! | [`resolver`] | Category create-if-absent |
//! | [`ingest`] | Load coordinator and report |
//! | [`db`] | Database connection |
//! | [`schema`] | Schema bootstrap |

pub mod categories;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod quotes;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod search;
pub mod sources;
pub mod stats;
