use anyhow::Result;

use crate::config::Config;
use crate::registry;

/// List the configured category→source bindings.
pub fn list_sources(config: &Config) -> Result<()> {
    let bindings = registry::resolve_bindings(config)?;

    println!(
        "{:<14} {:<14} {:<14} {:<32} LABEL",
        "NAME", "TAG", "SLUG", "BASE URL"
    );
    for b in &bindings {
        println!(
            "{:<14} {:<14} {:<14} {:<32} {}",
            b.name,
            b.tag,
            b.slug,
            b.base_url.as_deref().unwrap_or(&config.fetch.base_url),
            b.label.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
