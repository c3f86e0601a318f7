use serde::{Deserialize, Serialize};

use crate::constants::TIMESTAMP_FORMAT;
use crate::models::{KnownShow, SeasonLengths, TrackedShow};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShowDto {
    pub index: usize,
    pub names: Vec<String>,
    pub start_season: u32,
    pub start_episode: u32,
    pub end_season: u32,
    pub end_episode: u32,
    pub quality: String,
    pub downloaded_episodes: Vec<[u32; 2]>,
    pub needed_episodes: Vec<[u32; 2]>,
    pub last_checked: Option<String>,
}

impl ShowDto {
    #[must_use]
    pub fn new(index: usize, show: &TrackedShow) -> Self {
        Self {
            index,
            names: show.names.clone(),
            start_season: show.start_season,
            start_episode: show.start_episode,
            end_season: show.end_season,
            end_episode: show.end_episode,
            quality: show.quality.clone(),
            downloaded_episodes: show.downloaded_episodes.to_pairs(),
            needed_episodes: show.needed_episodes.to_pairs(),
            last_checked: show
                .last_checked
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogEntryDto {
    pub name: String,
    pub episodes_per_season: SeasonLengths,
}

impl CatalogEntryDto {
    #[must_use]
    pub fn new(name: &str, show: &KnownShow) -> Self {
        Self {
            name: name.to_string(),
            episodes_per_season: show.episodes_per_season.clone(),
        }
    }
}

/// Season lengths as JSON (`12`, `[12, 13]`) or in the text form `"12,13"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LengthsInput {
    Structured(SeasonLengths),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct SetCatalogEntryRequest {
    pub episodes_per_season: LengthsInput,
}

#[derive(Debug, Deserialize)]
pub struct RenameCatalogEntryRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartScanRequest {
    /// Index of a single show; every show when absent.
    #[serde(default)]
    pub show: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ScanStartedResponse {
    pub started: bool,
}

#[derive(Debug, Serialize)]
pub struct ScanStopResponse {
    /// `false` when no scan was running.
    pub stopping: bool,
}
