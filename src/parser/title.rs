//! Offline release-title parser built on common fansub naming patterns.

use async_trait::async_trait;
use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::{ParseError, TitleParser};
use crate::models::{Catalog, ParsedRelease};

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexTitleParser;

impl RegexTitleParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TitleParser for RegexTitleParser {
    fn provider(&self) -> &str {
        "regex"
    }

    async fn parse(&self, title: &str, catalog: &Catalog) -> Result<ParsedRelease, ParseError> {
        parse_title(title, catalog).ok_or_else(|| ParseError::Unrecognized(title.to_string()))
    }
}

/// Recognised layouts, tried in order:
///
/// - `Title S02E07`, also dot-separated
/// - batches: an episode range such as `(01-12)` or `- 01-12`, or a
///   `Batch`/`Complete` tag. A number ending the show name (`Kaiju No. 8 - 10`)
///   is not a range start.
/// - `Title S2 - 07`
/// - `Title - 07`, where the season comes from a marker in the title or from
///   the catalog's season lengths when the number is absolute
#[must_use]
pub fn parse_title(title: &str, catalog: &Catalog) -> Option<ParsedRelease> {
    let body = strip_group(strip_extension(title.trim()));
    let quality = extract_resolution(title);

    parse_sxxexx(body)
        .or_else(|| parse_batch(body))
        .or_else(|| parse_season_dash(body))
        .or_else(|| parse_dash_episode(body, catalog))
        .map(|mut release| {
            release.quality = quality;
            release
        })
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn strip_extension(title: &str) -> &str {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)\.(?:mkv|mp4|avi|webm|torrent)$");
    re.find(title).map_or(title, |m| &title[..m.start()])
}

fn strip_group(title: &str) -> &str {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^\[[^\]]*\]\s*");
    re.find(title).map_or(title, |m| &title[m.end()..])
}

fn number(caps: &Captures, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

fn parse_sxxexx(body: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?i)^(?P<title>.*?)[\s._-]*\bS(?P<season>\d{1,2})E(?P<episode>\d{1,4})(?:v\d+)?\b",
    );

    let caps = re.captures(body)?;
    let show = clean_title(caps.name("title")?.as_str())?;
    Some(ParsedRelease {
        show: Some(show),
        season: number(&caps, "season")?,
        episode: Some(number(&caps, "episode")?),
        is_batch: false,
        quality: None,
    })
}

fn parse_batch(body: &str) -> Option<ParsedRelease> {
    static RANGE: OnceLock<Regex> = OnceLock::new();
    static KEYWORD: OnceLock<Regex> = OnceLock::new();
    let range = get_regex(
        &RANGE,
        r"(?:[(\[]|\s-\s*)(?P<from>\d{1,4})\s*[-~]\s*(?P<to>\d{1,4})(?:[\s)\]]|$)",
    );
    let keyword = get_regex(&KEYWORD, r"(?i)\b(?:batch|complete)\b");

    let range_start = range.captures(body).and_then(|caps| {
        let from = number(&caps, "from")?;
        let to = number(&caps, "to")?;
        if from < to && from < 1900 {
            caps.get(0).map(|m| m.start())
        } else {
            None
        }
    });
    let keyword_start = keyword.find(body).map(|m| m.start());
    if range_start.is_none() && keyword_start.is_none() {
        return None;
    }

    let marker = season_marker(body);
    let bracket_start = body.find(['[', '(']).filter(|pos| *pos > 0);
    let cut = [
        range_start,
        keyword_start,
        marker.as_ref().map(|m| m.start),
        bracket_start,
    ]
    .into_iter()
    .flatten()
    .min()?;

    let show = clean_title(&body[..cut])?;
    let season = marker
        .map(|m| m.season)
        .or_else(|| season_marker(&show).map(|m| m.season))
        .unwrap_or(1);

    Some(ParsedRelease {
        show: Some(show),
        season,
        episode: None,
        is_batch: true,
        quality: None,
    })
}

fn parse_season_dash(body: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?i)^(?P<title>.+?)\s+S(?P<season>\d{1,2})\s*-\s*(?P<episode>\d{1,4})(?:v\d+)?(?:[\s\[(]|$)",
    );

    let caps = re.captures(body)?;
    Some(ParsedRelease {
        show: Some(clean_title(caps.name("title")?.as_str())?),
        season: number(&caps, "season")?,
        episode: Some(number(&caps, "episode")?),
        is_batch: false,
        quality: None,
    })
}

fn parse_dash_episode(body: &str, catalog: &Catalog) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)\s+-\s+(?P<episode>\d{1,4})(?:v\d+)?(?:[\s\[(]|$)",
    );

    let caps = re.captures(body)?;
    let raw_title = caps.name("title")?.as_str();
    let episode = number(&caps, "episode")?;

    if let Some(marker) = season_marker(raw_title) {
        let show = clean_title(&raw_title[..marker.start])?;
        return Some(ParsedRelease {
            show: Some(show),
            season: marker.season,
            episode: Some(episode),
            is_batch: false,
            quality: None,
        });
    }

    let show = clean_title(raw_title)?;
    let (season, episode) = catalog
        .season_episode(&show, episode)
        .unwrap_or((1, episode));
    Some(ParsedRelease {
        show: Some(show),
        season,
        episode: Some(episode),
        is_batch: false,
        quality: None,
    })
}

struct SeasonMarker {
    start: usize,
    season: u32,
}

/// Finds `S2`, `Season 2` or `2nd Season` in `text`.
fn season_marker(text: &str) -> Option<SeasonMarker> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?i)\b(?:S(?P<short>\d{1,2})|Season\s*(?P<long>\d{1,2})|(?P<ordinal>\d{1,2})(?:st|nd|rd|th)\s+Season)\b",
    );

    let caps = re.captures(text)?;
    let season = number(&caps, "short")
        .or_else(|| number(&caps, "long"))
        .or_else(|| number(&caps, "ordinal"))?;
    Some(SeasonMarker {
        start: caps.get(0)?.start(),
        season,
    })
}

fn extract_resolution(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)\b(4K|2160p|1080p|720p|480p|576p)\b");

    re.find(s).map(|m| {
        let res = m.as_str();
        if res.eq_ignore_ascii_case("4K") {
            "4K".to_string()
        } else {
            res.to_lowercase()
        }
    })
}

/// Trims separators, turns dot-separated names into spaced ones and collapses
/// whitespace. `None` when nothing is left.
fn clean_title(title: &str) -> Option<String> {
    let title = title.trim().trim_end_matches(['-', '_', '.', ' ']);
    let spaced = if title.contains(' ') {
        title.to_string()
    } else {
        title.replace('.', " ")
    };

    let mut result = String::with_capacity(spaced.len());
    for word in spaced.split(|c: char| c.is_whitespace() || c == '_') {
        if word.is_empty() {
            continue;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }

    (!result.is_empty()).then_some(result)
}
