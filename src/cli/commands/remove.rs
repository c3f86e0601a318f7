//! Remove and reset tracked shows

use super::{commit, load_library};
use crate::config::Config;
use crate::services::Edit;

pub async fn cmd_remove_show(config: &Config, index: usize) -> anyhow::Result<()> {
    let (_, library) = load_library(config).await;
    let name = library.show(index)?.primary_name().to_string();

    commit(config, Edit::RemoveShow { index }).await?;
    println!("✓ Stopped tracking: {name}");
    Ok(())
}

pub async fn cmd_reset_show(config: &Config, index: usize) -> anyhow::Result<()> {
    let library = commit(config, Edit::ResetShow { index }).await?;
    let show = library.show(index)?;
    println!(
        "✓ Reset {}: {} episodes needed again",
        show.primary_name(),
        show.needed_episodes.len()
    );
    Ok(())
}
