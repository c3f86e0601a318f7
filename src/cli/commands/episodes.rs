//! Episodes command handler

use super::load_library;
use crate::config::Config;
use crate::services::{EpisodeState, episode_rows};

pub async fn cmd_episodes(config: &Config, index: usize) -> anyhow::Result<()> {
    let (_, library) = load_library(config).await;
    let show = library.show(index)?;
    let rows = episode_rows(show, &library.catalog);

    println!("{show}");
    println!("{:-<40}", "");

    if rows.is_empty() {
        println!("No episodes in range.");
        return Ok(());
    }

    println!("{:<10} {:>8}  Status", "Episode", "Absolute");
    for row in &rows {
        let status = match row.status {
            EpisodeState::Downloaded => "✓ Downloaded",
            EpisodeState::Needed => "  Needed",
        };
        println!(
            "S{:02}E{:02}     {:>8}  {}",
            row.season, row.episode, row.absolute, status
        );
    }

    let downloaded = rows
        .iter()
        .filter(|row| row.status == EpisodeState::Downloaded)
        .count();
    println!();
    println!("{downloaded}/{} downloaded", rows.len());

    Ok(())
}
