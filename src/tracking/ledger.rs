use crate::domain::{EpisodeKey, EpisodeSet};
use crate::models::{Catalog, TrackedShow};

use super::range::enumerate;

/// In-range episodes not yet downloaded. Pure function of the range, the
/// catalog and the downloaded ledger.
#[must_use]
pub fn needed_episodes(show: &TrackedShow, catalog: &Catalog) -> EpisodeSet {
    enumerate(show, catalog)
        .iter()
        .filter(|key| !show.downloaded_episodes.contains(key.season, key.episode))
        .collect()
}

/// Replaces `show.needed_episodes` wholesale.
pub fn recompute(show: &mut TrackedShow, catalog: &Catalog) {
    show.needed_episodes = needed_episodes(show, catalog);
}

pub fn recompute_all(shows: &mut [TrackedShow], catalog: &Catalog) {
    for show in shows {
        recompute(show, catalog);
    }
}

/// Moves every key that is currently needed over to downloaded. Keys that are
/// not needed are left alone. Returns the keys that moved.
pub fn acquire<I>(show: &mut TrackedShow, keys: I) -> Vec<EpisodeKey>
where
    I: IntoIterator<Item = EpisodeKey>,
{
    let mut moved = Vec::new();
    for key in keys {
        if show.needed_episodes.remove(key.season, key.episode) {
            show.downloaded_episodes.insert(key.season, key.episode);
            moved.push(key);
        }
    }
    moved.sort();
    moved
}

/// Needed episodes in scan order: season, then episode, ascending.
#[must_use]
pub fn needed_in_order(show: &TrackedShow) -> Vec<EpisodeKey> {
    show.needed_episodes.iter().collect()
}
