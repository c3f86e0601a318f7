//! Add and edit tracked shows

use super::commit;
use crate::config::Config;
use crate::domain::EpisodeKey;
use crate::models::ShowForm;
use crate::services::Edit;

pub async fn cmd_add_show(
    config: &Config,
    names: Vec<String>,
    from: EpisodeKey,
    to: EpisodeKey,
    quality: String,
) -> anyhow::Result<()> {
    let form = ShowForm {
        names,
        start_season: from.season,
        start_episode: from.episode,
        end_season: to.season,
        end_episode: to.episode,
        quality,
    };

    let library = commit(config, Edit::AddShow(form)).await?;
    let index = library.shows.len().saturating_sub(1);
    if let Some(show) = library.shows.get(index) {
        println!("✓ Tracking [{index}] {show}");
        println!("  {} episodes needed", show.needed_episodes.len());
    }
    Ok(())
}

pub async fn cmd_edit_show(
    config: &Config,
    index: usize,
    names: Vec<String>,
    from: Option<EpisodeKey>,
    to: Option<EpisodeKey>,
    quality: Option<String>,
) -> anyhow::Result<()> {
    let (_, library) = super::load_library(config).await;
    let mut form = library.show(index)?.form();

    if !names.is_empty() {
        form.names = names;
    }
    if let Some(from) = from {
        form.start_season = from.season;
        form.start_episode = from.episode;
    }
    if let Some(to) = to {
        form.end_season = to.season;
        form.end_episode = to.episode;
    }
    if let Some(quality) = quality {
        form.quality = quality;
    }

    let library = commit(config, Edit::UpdateShow { index, form }).await?;
    let show = library.show(index)?;
    println!("✓ Updated [{index}] {show}");
    println!("  {} episodes needed", show.needed_episodes.len());
    Ok(())
}
