//! List tracked shows command handler

use super::load_library;
use crate::config::Config;
use crate::constants::{TIMESTAMP_FORMAT, limits};
use crate::tracking::needed_in_order;

pub async fn cmd_list_shows(config: &Config) -> anyhow::Result<()> {
    let (_, library) = load_library(config).await;

    if library.shows.is_empty() {
        println!("No shows being tracked.");
        println!();
        println!("Add one with: trackarr add --name \"Show Name\" --from S1E1 --to S1E12");
        return Ok(());
    }

    println!("Tracked Shows ({} total)", library.shows.len());
    println!("{:-<70}", "");

    for (index, show) in library.shows.iter().enumerate() {
        let status_indicator = if show.needed_episodes.is_empty() {
            "✓"
        } else {
            "•"
        };
        println!("{status_indicator} [{index}] {show}");

        if show.names.len() > 1 {
            println!("  Aliases: {}", show.names[1..].join(", "));
        }

        let last_checked = show.last_checked.map_or_else(
            || "never".to_string(),
            |ts| ts.format(TIMESTAMP_FORMAT).to_string(),
        );
        println!(
            "  Downloaded: {} | Needed: {} | Last checked: {}",
            show.downloaded_episodes.len(),
            show.needed_episodes.len(),
            last_checked
        );

        let needed = needed_in_order(show);
        if !needed.is_empty() {
            let listed: Vec<String> = needed
                .iter()
                .take(limits::LISTED_EPISODES)
                .map(ToString::to_string)
                .collect();
            let more = needed.len().saturating_sub(limits::LISTED_EPISODES);
            if more > 0 {
                println!("  Next: {} (+{more} more)", listed.join(" "));
            } else {
                println!("  Next: {}", listed.join(" "));
            }
        }
    }

    println!();
    println!("Legend: ✓ Complete | • Episodes needed");

    Ok(())
}
