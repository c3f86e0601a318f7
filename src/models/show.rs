use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_QUALITY, defaults};
use crate::domain::EpisodeSet;

/// A series being monitored for releases inside an inclusive
/// `(start_season, start_episode) -> (end_season, end_episode)` range.
///
/// Field order matches the ledger file record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedShow {
    #[serde(default)]
    pub names: Vec<String>,

    #[serde(default = "default_start_season")]
    pub start_season: u32,

    #[serde(default = "default_start_episode")]
    pub start_episode: u32,

    #[serde(default = "default_end_season")]
    pub end_season: u32,

    #[serde(default = "default_end_episode")]
    pub end_episode: u32,

    #[serde(default = "default_quality")]
    pub quality: String,

    #[serde(default)]
    pub downloaded_episodes: EpisodeSet,

    /// Derived from the range, the catalog and `downloaded_episodes`.
    #[serde(default)]
    pub needed_episodes: EpisodeSet,

    #[serde(default, with = "timestamp")]
    pub last_checked: Option<NaiveDateTime>,
}

const fn default_start_season() -> u32 {
    defaults::START_SEASON
}

const fn default_start_episode() -> u32 {
    defaults::START_EPISODE
}

const fn default_end_season() -> u32 {
    defaults::END_SEASON
}

const fn default_end_episode() -> u32 {
    defaults::END_EPISODE
}

fn default_quality() -> String {
    DEFAULT_QUALITY.to_string()
}

impl TrackedShow {
    /// Builds a fresh show from a validated form with empty ledgers.
    #[must_use]
    pub fn from_form(form: ShowForm) -> Self {
        Self {
            names: form.names,
            start_season: form.start_season,
            start_episode: form.start_episode,
            end_season: form.end_season,
            end_episode: form.end_episode,
            quality: form.quality,
            downloaded_episodes: EpisodeSet::new(),
            needed_episodes: EpisodeSet::new(),
            last_checked: None,
        }
    }

    /// First alias; used for catalog lookups and display.
    #[must_use]
    pub fn primary_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn form(&self) -> ShowForm {
        ShowForm {
            names: self.names.clone(),
            start_season: self.start_season,
            start_episode: self.start_episode,
            end_season: self.end_season,
            end_episode: self.end_episode,
            quality: self.quality.clone(),
        }
    }
}

impl fmt::Display for TrackedShow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - S{}E{}→S{}E{} ({})",
            self.primary_name(),
            self.start_season,
            self.start_episode,
            self.end_season,
            self.end_episode,
            self.quality
        )
    }
}

/// User-editable part of a tracked show, as captured by any front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowForm {
    pub names: Vec<String>,

    #[serde(default = "default_start_season")]
    pub start_season: u32,

    #[serde(default = "default_start_episode")]
    pub start_episode: u32,

    #[serde(default = "default_end_season")]
    pub end_season: u32,

    #[serde(default = "default_end_episode")]
    pub end_episode: u32,

    #[serde(default = "default_quality")]
    pub quality: String,
}

/// `last_checked` as local wall-clock text; unreadable values load as `None`.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::constants::TIMESTAMP_FORMAT;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|text| {
            NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
                .ok()
                .or_else(|| {
                    DateTime::parse_from_rfc3339(&text)
                        .ok()
                        .map(|dt| dt.naive_local())
                })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let show: TrackedShow = serde_json::from_str("{}").unwrap();
        assert!(show.names.is_empty());
        assert_eq!(show.start_season, 1);
        assert_eq!(show.start_episode, 1);
        assert_eq!(show.end_season, 1);
        assert_eq!(show.end_episode, 12);
        assert_eq!(show.quality, "1080p");
        assert!(show.last_checked.is_none());
        assert_eq!(show.primary_name(), "");
    }

    #[test]
    fn form_defaults_match_ledger_defaults() {
        let form: ShowForm = serde_json::from_str(r#"{"names":["Mushishi"]}"#).unwrap();
        assert_eq!(
            (form.start_season, form.start_episode, form.end_season, form.end_episode),
            (1, 1, 1, 12)
        );
        assert_eq!(form.quality, "1080p");
    }

    #[test]
    fn last_checked_round_trips_in_ledger_format() {
        let json = r#"{"names":["Mushishi"],"last_checked":"2024-03-05 21:14:09"}"#;
        let show: TrackedShow = serde_json::from_str(json).unwrap();
        let ts = show.last_checked.unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "21:14");

        let out = serde_json::to_value(&show).unwrap();
        assert_eq!(out["last_checked"], "2024-03-05 21:14:09");
    }

    #[test]
    fn unreadable_timestamp_loads_as_none() {
        let json = r#"{"names":["Mushishi"],"last_checked":"yesterday"}"#;
        let show: TrackedShow = serde_json::from_str(json).unwrap();
        assert!(show.last_checked.is_none());
    }

    #[test]
    fn display_label_shows_range_and_quality() {
        let show: TrackedShow = serde_json::from_str(
            r#"{"names":["Dorohedoro"],"start_season":1,"start_episode":3,"end_season":2,"end_episode":6,"quality":"720p"}"#,
        )
        .unwrap();
        assert_eq!(show.to_string(), "Dorohedoro - S1E3→S2E6 (720p)");
    }
}
