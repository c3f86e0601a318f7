//! Domain primitives for episode bookkeeping.
//!
//! [`EpisodeSet`] is the in-memory ledger shape used for both the downloaded and
//! the needed side of a tracked show: season number mapped to the set of episode
//! numbers. On disk it is a flat list of `[season, episode]` pairs sorted by
//! `(season, episode)`.

pub mod events;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A `(season, episode)` coordinate.
///
/// # Examples
///
/// ```rust
/// use trackarr::domain::EpisodeKey;
///
/// let key = EpisodeKey::new(2, 7);
/// assert_eq!(key.to_string(), "S02E07");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpisodeKey {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeKey {
    #[must_use]
    pub const fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

impl From<(u32, u32)> for EpisodeKey {
    fn from((season, episode): (u32, u32)) -> Self {
        Self::new(season, episode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid episode '{0}': expected the form S1E12")]
pub struct InvalidEpisodeKey(pub String);

impl FromStr for EpisodeKey {
    type Err = InvalidEpisodeKey;

    /// Accepts `S1E12`, `s01e12` and similar.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidEpisodeKey(input.to_string());
        let upper = input.trim().to_ascii_uppercase();
        let (season, episode) = upper
            .strip_prefix('S')
            .and_then(|rest| rest.split_once('E'))
            .ok_or_else(invalid)?;
        let season: u32 = season.parse().map_err(|_| invalid())?;
        let episode: u32 = episode.parse().map_err(|_| invalid())?;
        if season == 0 || episode == 0 {
            return Err(invalid());
        }
        Ok(Self::new(season, episode))
    }
}

/// Season to episode-set mapping.
///
/// Never stores a season with an empty episode set: removing the last episode
/// of a season drops the season key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeSet(BTreeMap<u32, BTreeSet<u32>>);

impl EpisodeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, season: u32, episode: u32) -> bool {
        self.0.entry(season).or_default().insert(episode)
    }

    /// Removes one episode and prunes the season if it became empty.
    pub fn remove(&mut self, season: u32, episode: u32) -> bool {
        let Some(episodes) = self.0.get_mut(&season) else {
            return false;
        };
        let removed = episodes.remove(&episode);
        if episodes.is_empty() {
            self.0.remove(&season);
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, season: u32, episode: u32) -> bool {
        self.0
            .get(&season)
            .is_some_and(|episodes| episodes.contains(&episode))
    }

    #[must_use]
    pub fn season(&self, season: u32) -> Option<&BTreeSet<u32>> {
        self.0.get(&season)
    }

    pub fn seasons(&self) -> impl Iterator<Item = (u32, &BTreeSet<u32>)> {
        self.0.iter().map(|(season, episodes)| (*season, episodes))
    }

    /// All pairs in ascending `(season, episode)` order.
    pub fn iter(&self) -> impl Iterator<Item = EpisodeKey> + '_ {
        self.0.iter().flat_map(|(season, episodes)| {
            episodes
                .iter()
                .map(move |episode| EpisodeKey::new(*season, *episode))
        })
    }

    #[must_use]
    pub fn to_pairs(&self) -> Vec<[u32; 2]> {
        self.iter().map(|key| [key.season, key.episode]).collect()
    }

    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = [u32; 2]>,
    {
        let mut set = Self::new();
        for [season, episode] in pairs {
            set.insert(season, episode);
        }
        set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<EpisodeKey> for EpisodeSet {
    fn from_iter<T: IntoIterator<Item = EpisodeKey>>(iter: T) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key.season, key.episode);
        }
        set
    }
}

impl Serialize for EpisodeSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_pairs().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EpisodeSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pairs = Vec::<[u32; 2]>::deserialize(deserializer)?;
        Ok(Self::from_pairs(pairs))
    }
}
