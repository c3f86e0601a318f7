use crate::domain::EpisodeSet;
use crate::models::{Catalog, TrackedShow};

/// Inclusive episode bounds of `season` within the show's tracked range.
///
/// With catalog metadata the season length `L` comes from the catalog and the
/// upper bound is clamped to it. Without metadata the show's own
/// `end_episode` stands in for `L` and nothing is clamped.
fn season_bounds(show: &TrackedShow, catalog: &Catalog, season: u32) -> (u32, u32) {
    let known_length = catalog.season_length(show.primary_name(), season);
    let length = known_length.unwrap_or(show.end_episode);

    let lower = if season == show.start_season {
        show.start_episode
    } else {
        1
    };
    let mut upper = if season == show.end_season {
        show.end_episode
    } else {
        length
    };
    if known_length.is_some() {
        upper = upper.min(length);
    }

    let lower = lower.max(1);
    (lower, upper.max(lower))
}

/// Every `(season, episode)` inside the show's tracked range, seasons
/// `start_season..=end_season`.
#[must_use]
pub fn enumerate(show: &TrackedShow, catalog: &Catalog) -> EpisodeSet {
    let mut episodes = EpisodeSet::new();
    if show.end_season < show.start_season {
        return episodes;
    }

    for season in show.start_season..=show.end_season {
        let (lower, upper) = season_bounds(show, catalog, season);
        for episode in lower..=upper {
            episodes.insert(season, episode);
        }
    }
    episodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeasonLengths, ShowForm};

    fn show(name: &str, from: (u32, u32), to: (u32, u32)) -> TrackedShow {
        TrackedShow::from_form(ShowForm {
            names: vec![name.to_string()],
            start_season: from.0,
            start_episode: from.1,
            end_season: to.0,
            end_episode: to.1,
            quality: "1080p".to_string(),
        })
    }

    fn catalog(name: &str, lengths: SeasonLengths) -> Catalog {
        [(name.to_string(), lengths)].into_iter().collect()
    }

    fn season(set: &EpisodeSet, season: u32) -> Vec<u32> {
        set.season(season)
            .map(|eps| eps.iter().copied().collect())
            .unwrap_or_default()
    }

    #[test]
    fn known_single_season_yields_exact_range() {
        let catalog = catalog("Mob Psycho 100", SeasonLengths::Uniform(12));
        let set = enumerate(&show("Mob Psycho 100", (1, 3), (1, 9)), &catalog);
        assert_eq!(season(&set, 1), (3..=9).collect::<Vec<_>>());
        assert_eq!(set.seasons().count(), 1);
    }

    #[test]
    fn per_season_lengths_cover_full_seasons() {
        let catalog = catalog("Vinland Saga", SeasonLengths::PerSeason(vec![12, 13]));
        let set = enumerate(&show("Vinland Saga", (1, 1), (2, 13)), &catalog);
        assert_eq!(season(&set, 1), (1..=12).collect::<Vec<_>>());
        assert_eq!(season(&set, 2), (1..=13).collect::<Vec<_>>());
    }

    #[test]
    fn unknown_show_uses_end_episode_as_season_length() {
        let set = enumerate(&show("Unlisted", (1, 1), (2, 5)), &Catalog::new());
        assert_eq!(season(&set, 1), vec![1, 2, 3, 4, 5]);
        assert_eq!(season(&set, 2), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unknown_show_interior_seasons_are_not_clamped() {
        let set = enumerate(&show("Unlisted", (1, 10), (3, 14)), &Catalog::new());
        assert_eq!(season(&set, 1), vec![10, 11, 12, 13, 14]);
        assert_eq!(season(&set, 2), (1..=14).collect::<Vec<_>>());
        assert_eq!(season(&set, 3), (1..=14).collect::<Vec<_>>());
    }

    #[test]
    fn end_episode_is_clamped_to_known_length() {
        let catalog = catalog("Short", SeasonLengths::PerSeason(vec![10]));
        let set = enumerate(&show("Short", (1, 1), (1, 24)), &catalog);
        assert_eq!(season(&set, 1), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn seasons_past_the_list_default_to_twelve() {
        let catalog = catalog("Long Runner", SeasonLengths::PerSeason(vec![24]));
        let set = enumerate(&show("Long Runner", (1, 20), (3, 2)), &catalog);
        assert_eq!(season(&set, 1), vec![20, 21, 22, 23, 24]);
        assert_eq!(season(&set, 2), (1..=12).collect::<Vec<_>>());
        assert_eq!(season(&set, 3), vec![1, 2]);
    }

    #[test]
    fn collapsed_bounds_floor_at_lower() {
        let catalog = catalog("Tiny", SeasonLengths::Uniform(4));
        let set = enumerate(&show("Tiny", (1, 6), (1, 8)), &catalog);
        assert_eq!(season(&set, 1), vec![6]);
    }

    #[test]
    fn inverted_season_range_is_empty() {
        let set = enumerate(&show("Backwards", (3, 1), (2, 5)), &Catalog::new());
        assert!(set.is_empty());
    }

    #[test]
    fn catalog_lookup_uses_primary_name_only() {
        let catalog = catalog("Alias", SeasonLengths::Uniform(3));
        let mut tracked = show("Primary", (1, 1), (2, 5));
        tracked.names.push("Alias".to_string());
        let set = enumerate(&tracked, &catalog);
        assert_eq!(season(&set, 1).len(), 5);
    }
}
