//! The source registry: the configured set of category→source bindings
//! that drives ingestion fan-out.
//!
//! When the config file carries no `[[sources]]` list, a built-in default
//! set of nine categories is used, each with its canonical slug,
//! description, and icon glyph.

use crate::config::Config;
use crate::error::DuplicateSlug;

/// A resolved category→source binding with all metadata filled in.
#[derive(Debug, Clone)]
pub struct SourceBinding {
    /// Display name of the category (e.g. "Love").
    pub name: String,
    /// Upstream tag queried for this category (e.g. "love").
    pub tag: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    /// Provenance label attached to fetched records; never fabricated
    /// when unset.
    pub label: Option<String>,
    /// Per-source base URL override.
    pub base_url: Option<String>,
}

const DEFAULT_ICON: &str = "📖";

fn binding(name: &str, tag: &str, description: &str, icon: &str) -> SourceBinding {
    SourceBinding {
        name: name.to_string(),
        tag: tag.to_string(),
        slug: name.to_lowercase(),
        description: description.to_string(),
        icon: icon.to_string(),
        label: None,
        base_url: None,
    }
}

/// The built-in category set used when no `[[sources]]` are configured.
pub fn default_bindings() -> Vec<SourceBinding> {
    vec![
        binding(
            "Life",
            "life",
            "Quotes about life, living, and everyday wisdom",
            "🌟",
        ),
        binding(
            "Wisdom",
            "wisdom",
            "Timeless wisdom and philosophical insights",
            "🧠",
        ),
        binding(
            "Motivation",
            "motivational",
            "Get motivated to achieve your goals",
            "🚀",
        ),
        binding("Success", "success", "Insights on achieving success", "🏆"),
        binding(
            "Friendship",
            "friendship",
            "Celebrating friendship and bonds",
            "🤝",
        ),
        binding("Love", "love", "Beautiful words about love", "❤️"),
        binding(
            "Inspiration",
            "inspirational",
            "Find daily inspiration",
            "✨",
        ),
        binding("Faith", "faith", "Spiritual and faith-based quotes", "🙏"),
        binding("Courage", "courage", "Embrace courage and strength", "💪"),
    ]
}

/// Resolve the effective binding list for a run: the configured sources
/// (with slug fallback and metadata defaults applied) or the built-in set.
///
/// Fails with [`DuplicateSlug`] when two distinct names would share a
/// slug — a structural misconfiguration that aborts the run rather than
/// being silently merged.
pub fn resolve_bindings(config: &Config) -> Result<Vec<SourceBinding>, DuplicateSlug> {
    let bindings: Vec<SourceBinding> = match &config.sources {
        Some(entries) => entries
            .iter()
            .map(|e| SourceBinding {
                name: e.name.clone(),
                tag: e.tag.clone(),
                slug: e.slug.clone().unwrap_or_else(|| e.name.to_lowercase()),
                description: e.description.clone().unwrap_or_default(),
                icon: e.icon.clone().unwrap_or_else(|| DEFAULT_ICON.to_string()),
                label: e.label.clone(),
                base_url: e.base_url.clone(),
            })
            .collect(),
        None => default_bindings(),
    };

    for (i, a) in bindings.iter().enumerate() {
        for b in bindings.iter().skip(i + 1) {
            if a.slug == b.slug || a.name == b.name {
                return Err(DuplicateSlug {
                    slug: b.slug.clone(),
                    first: a.name.clone(),
                    second: b.name.clone(),
                });
            }
        }
    }

    Ok(bindings)
}
