//! Known-shows catalog commands

use super::{commit, load_library};
use crate::config::Config;
use crate::models::SeasonLengths;
use crate::services::Edit;

pub async fn cmd_catalog_list(config: &Config) -> anyhow::Result<()> {
    let (_, library) = load_library(config).await;

    if library.catalog.is_empty() {
        println!("Catalog is empty.");
        println!("Add an entry with: trackarr catalog set \"Show Name\" 12,13");
        return Ok(());
    }

    println!("Known Shows ({} total)", library.catalog.len());
    println!("{:-<60}", "");
    for (name, show) in library.catalog.iter() {
        println!("{name}: {}", show.episodes_per_season);
    }
    Ok(())
}

pub async fn cmd_catalog_set(config: &Config, name: &str, lengths: &str) -> anyhow::Result<()> {
    let lengths: SeasonLengths = lengths.parse()?;
    commit(
        config,
        Edit::SetCatalogEntry {
            name: name.to_string(),
            lengths: lengths.clone(),
        },
    )
    .await?;
    println!("✓ {}: {lengths}", name.trim());
    Ok(())
}

pub async fn cmd_catalog_rename(config: &Config, from: &str, to: &str) -> anyhow::Result<()> {
    commit(
        config,
        Edit::RenameCatalogEntry {
            from: from.to_string(),
            to: to.to_string(),
        },
    )
    .await?;
    println!("✓ Renamed '{from}' to '{}'", to.trim());
    Ok(())
}

pub async fn cmd_catalog_remove(config: &Config, name: &str) -> anyhow::Result<()> {
    commit(
        config,
        Edit::RemoveCatalogEntry {
            name: name.to_string(),
        },
    )
    .await?;
    println!("✓ Removed '{name}' from the catalog");
    Ok(())
}
