//! Known-shows catalog: season-length metadata keyed by canonical show name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::DEFAULT_SEASON_LENGTH;

/// Episodes per season, either one count for every season or a per-season list
/// (position 0 is season 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeasonLengths {
    Uniform(u32),
    PerSeason(Vec<u32>),
}

impl SeasonLengths {
    /// Length of `season`; list lookups past the end (or season 0) fall back
    /// to [`DEFAULT_SEASON_LENGTH`].
    #[must_use]
    pub fn for_season(&self, season: u32) -> u32 {
        match self {
            Self::Uniform(count) => *count,
            Self::PerSeason(counts) => season
                .checked_sub(1)
                .and_then(|index| counts.get(index as usize))
                .copied()
                .unwrap_or(DEFAULT_SEASON_LENGTH),
        }
    }

    /// Number of episodes aired before `season` begins.
    #[must_use]
    pub fn episodes_before(&self, season: u32) -> u32 {
        let prior = season.saturating_sub(1);
        match self {
            Self::Uniform(count) => prior.saturating_mul(*count),
            Self::PerSeason(counts) => counts.iter().take(prior as usize).sum(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), InvalidSeasonLengths> {
        let valid = match self {
            Self::Uniform(count) => *count > 0,
            Self::PerSeason(counts) => !counts.is_empty() && counts.iter().all(|c| *c > 0),
        };
        if valid {
            Ok(())
        } else {
            Err(InvalidSeasonLengths(self.to_string()))
        }
    }
}

impl Default for SeasonLengths {
    fn default() -> Self {
        Self::Uniform(DEFAULT_SEASON_LENGTH)
    }
}

impl fmt::Display for SeasonLengths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(count) => write!(f, "{count}"),
            Self::PerSeason(counts) => {
                let joined: Vec<String> = counts.iter().map(u32::to_string).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid episode counts '{0}': use positive integers separated by commas")]
pub struct InvalidSeasonLengths(pub String);

impl FromStr for SeasonLengths {
    type Err = InvalidSeasonLengths;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let invalid = || InvalidSeasonLengths(input.to_string());

        let lengths = if input.contains(',') {
            let counts = input
                .split(',')
                .map(|part| part.trim().parse::<u32>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;
            Self::PerSeason(counts)
        } else {
            Self::Uniform(input.parse().map_err(|_| invalid())?)
        };

        lengths.validate()?;
        Ok(lengths)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KnownShow {
    #[serde(default)]
    pub episodes_per_season: SeasonLengths,
}

impl KnownShow {
    #[must_use]
    pub const fn new(episodes_per_season: SeasonLengths) -> Self {
        Self {
            episodes_per_season,
        }
    }
}

/// Mapping of canonical show name to its season metadata.
///
/// Lookups are by exact key; no normalization is applied here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, KnownShow>);

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&KnownShow> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Known length of `season` for `name`, or `None` when the show is not in
    /// the catalog.
    #[must_use]
    pub fn season_length(&self, name: &str, season: u32) -> Option<u32> {
        self.get(name)
            .map(|show| show.episodes_per_season.for_season(season))
    }

    /// Absolute episode number counting every episode of the prior seasons.
    /// Shows missing from the catalog are assumed to run twelve episodes a
    /// season.
    #[must_use]
    pub fn absolute_episode(&self, name: &str, season: u32, episode: u32) -> u32 {
        let before = self.get(name).map_or_else(
            || SeasonLengths::default().episodes_before(season),
            |show| show.episodes_per_season.episodes_before(season),
        );
        before.saturating_add(episode)
    }

    /// Inverse of [`Catalog::absolute_episode`] for shows the catalog knows:
    /// splits an absolute number into `(season, episode)`.
    #[must_use]
    pub fn season_episode(&self, name: &str, absolute: u32) -> Option<(u32, u32)> {
        let lengths = &self.get(name)?.episodes_per_season;
        if absolute == 0 {
            return None;
        }

        let mut remaining = absolute;
        let mut season = 1;
        loop {
            let length = lengths.for_season(season);
            if length == 0 {
                return None;
            }
            if remaining <= length {
                return Some((season, remaining));
            }
            remaining -= length;
            season += 1;
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, lengths: SeasonLengths) -> Option<KnownShow> {
        self.0.insert(name.into(), KnownShow::new(lengths))
    }

    pub fn remove(&mut self, name: &str) -> Option<KnownShow> {
        self.0.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KnownShow)> {
        self.0.iter().map(|(name, show)| (name.as_str(), show))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SeasonLengths)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, SeasonLengths)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, lengths)| (name, KnownShow::new(lengths)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_season_lookup_clamps_to_default() {
        let lengths = SeasonLengths::PerSeason(vec![12, 13]);
        assert_eq!(lengths.for_season(1), 12);
        assert_eq!(lengths.for_season(2), 13);
        assert_eq!(lengths.for_season(3), DEFAULT_SEASON_LENGTH);
        assert_eq!(lengths.for_season(0), DEFAULT_SEASON_LENGTH);
    }

    #[test]
    fn uniform_lookup_ignores_season() {
        let lengths = SeasonLengths::Uniform(24);
        assert_eq!(lengths.for_season(1), 24);
        assert_eq!(lengths.for_season(9), 24);
    }

    #[test]
    fn parses_scalar_and_list_forms() {
        assert_eq!("12".parse(), Ok(SeasonLengths::Uniform(12)));
        assert_eq!(
            " 12, 13,24 ".parse(),
            Ok(SeasonLengths::PerSeason(vec![12, 13, 24]))
        );
        assert!("twelve".parse::<SeasonLengths>().is_err());
        assert!("12,".parse::<SeasonLengths>().is_err());
        assert!("0".parse::<SeasonLengths>().is_err());
        assert!("".parse::<SeasonLengths>().is_err());
    }

    #[test]
    fn catalog_file_shape_deserializes() {
        let json = r#"{
            "Frieren": {"episodes_per_season": [28]},
            "One Piece": {"episodes_per_season": 24},
            "Mystery": {}
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.season_length("Frieren", 1), Some(28));
        assert_eq!(catalog.season_length("One Piece", 5), Some(24));
        assert_eq!(catalog.season_length("Mystery", 1), Some(12));
        assert_eq!(catalog.season_length("frieren", 1), None);
    }

    #[test]
    fn absolute_episode_sums_prior_seasons() {
        let catalog: Catalog = [
            ("Listed".to_string(), SeasonLengths::PerSeason(vec![12, 13])),
            ("Uniform".to_string(), SeasonLengths::Uniform(10)),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.absolute_episode("Listed", 2, 1), 13);
        assert_eq!(catalog.absolute_episode("Listed", 3, 2), 27);
        assert_eq!(catalog.absolute_episode("Uniform", 3, 4), 24);
        assert_eq!(catalog.absolute_episode("Unknown", 2, 1), 13);
    }

    #[test]
    fn season_episode_inverts_absolute_numbering() {
        let catalog: Catalog = [("Listed".to_string(), SeasonLengths::PerSeason(vec![12, 13]))]
            .into_iter()
            .collect();

        assert_eq!(catalog.season_episode("Listed", 12), Some((1, 12)));
        assert_eq!(catalog.season_episode("Listed", 13), Some((2, 1)));
        assert_eq!(catalog.season_episode("Listed", 26), Some((3, 1)));
        assert_eq!(catalog.season_episode("Listed", 0), None);
        assert_eq!(catalog.season_episode("Unknown", 5), None);
    }

    #[test]
    fn display_matches_input_form() {
        assert_eq!(SeasonLengths::PerSeason(vec![12, 13]).to_string(), "12,13");
        assert_eq!(SeasonLengths::Uniform(12).to_string(), "12");
    }
}
