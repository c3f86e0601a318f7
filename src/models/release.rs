use serde::{Deserialize, Serialize};

/// Structured metadata extracted from a free-text release title.
///
/// Fields the parser could not determine are `None` and never compare equal
/// to anything the matcher checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedRelease {
    pub show: Option<String>,

    /// Defaults to 1 when the title carries no season marker.
    pub season: u32,

    /// Absent for batches.
    pub episode: Option<u32>,

    pub is_batch: bool,

    pub quality: Option<String>,
}

impl ParsedRelease {
    #[must_use]
    pub fn episode(show: &str, season: u32, episode: u32, quality: &str) -> Self {
        Self {
            show: Some(show.to_string()),
            season,
            episode: Some(episode),
            is_batch: false,
            quality: Some(quality.to_string()),
        }
    }

    #[must_use]
    pub fn batch(show: &str, season: u32, quality: &str) -> Self {
        Self {
            show: Some(show.to_string()),
            season,
            episode: None,
            is_batch: true,
            quality: Some(quality.to_string()),
        }
    }
}

/// One row returned by the content index: a release title and the locator
/// handed to the download handler when it matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub locator: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator: locator.into(),
        }
    }
}
