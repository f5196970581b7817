//! Core data models used throughout quote-harvest.
//!
//! These types represent the quotes and categories that flow through the
//! ingestion pipeline and are persisted in SQLite.

use serde::Deserialize;

/// Raw record as received from an upstream source, before normalization.
///
/// Every field is optional: upstream payloads are inconsistent and the
/// normalizer degrades missing pieces to defaults rather than erroring.
/// Exists only within one load run; never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "text")]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<TagField>,
    /// Provenance label attached by the source client when configured.
    /// Never present in the upstream payload itself.
    #[serde(skip)]
    pub source: Option<String>,
}

/// Upstream tags arrive either as a JSON array or a single comma-delimited
/// string; both shapes occur in the wild.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagField {
    List(Vec<String>),
    Joined(String),
}

/// Normalized, pipeline-internal quote representation prior to persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub text: String,
    pub author: String,
    pub tags: Vec<String>,
    pub source: Option<String>,
}

/// A quote category stored in SQLite.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub quote_count: i64,
    #[allow(dead_code)]
    pub created_at: i64,
}

/// A persisted quote. Created once by the load coordinator, never mutated
/// by the pipeline afterwards.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Quote {
    pub id: String,
    pub category_id: String,
    pub text: String,
    pub author: String,
    pub tags: Option<String>,
    pub source: Option<String>,
    pub dedup_key: String,
    pub created_at: i64,
}
