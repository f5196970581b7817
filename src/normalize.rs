//! Record normalization: raw upstream records into the canonical quote
//! shape.
//!
//! `normalize` is pure and total — malformed input degrades to defaults
//! rather than erroring. The only way a record leaves the pipeline here is
//! the empty-text drop, signalled as `None` and counted as skipped by the
//! coordinator.

use sha2::{Digest, Sha256};

use crate::models::{CanonicalRecord, RawRecord, TagField};

/// Sentinel author for records with no usable attribution.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Placeholder artifacts some upstreams append to the author field.
/// Stripped so they never reach the displayed author.
const AUTHOR_ARTIFACTS: &[&str] = &[", type.unknown"];

pub fn normalize(raw: RawRecord) -> Option<CanonicalRecord> {
    let text = raw.content.as_deref().unwrap_or("").trim().to_string();
    if text.is_empty() {
        return None;
    }

    let mut author = raw.author.unwrap_or_default();
    for artifact in AUTHOR_ARTIFACTS {
        author = author.replace(artifact, "");
    }
    let author = author.trim();
    let author = if author.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        author.to_string()
    };

    let tags = match raw.tags {
        Some(TagField::List(list)) => clean_tags(list),
        Some(TagField::Joined(joined)) => clean_tags(joined.split(',').map(String::from)),
        None => Vec::new(),
    };

    Some(CanonicalRecord {
        text,
        author,
        tags,
        // Passed through verbatim; provenance is never fabricated.
        source: raw.source,
    })
}

fn clean_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Content-identity key for deduplication: lower-cased, whitespace-collapsed
/// text paired with the lower-cased author, hashed for compact storage and
/// indexed lookup.
pub fn dedup_key(text: &str, author: &str) -> String {
    let text_norm = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let author_norm = author.trim().to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(text_norm.as_bytes());
    hasher.update(b"\n");
    hasher.update(author_norm.as_bytes());
    format!("{:x}", hasher.finalize())
}
