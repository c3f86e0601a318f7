use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::constants::DEFAULT_SEASON_LENGTH;
use crate::domain::EpisodeKey;
use crate::models::{Catalog, ParsedRelease, TrackedShow};

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// Lowercases, trims, drops `' " , : ; -` (and typographic single quotes) and
/// collapses runs of whitespace.
#[must_use]
pub fn normalize_show_name(name: &str) -> String {
    static PUNCT: OnceLock<Regex> = OnceLock::new();
    static SPACE: OnceLock<Regex> = OnceLock::new();

    let lowered = name.to_lowercase();
    let stripped = get_regex(&PUNCT, r#"['‘’",:;\-]"#).replace_all(lowered.trim(), "");
    get_regex(&SPACE, r"\s+")
        .replace_all(&stripped, " ")
        .into_owned()
}

/// Same as [`normalize_show_name`] but drops a possessive `'s` first, so
/// "Titan's" reads as "titan" rather than "titans".
fn normalize_without_possessive(name: &str) -> String {
    static POSSESSIVE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&POSSESSIVE, r"(?i)['‘’]s\b");
    normalize_show_name(&re.replace_all(name, ""))
}

fn names_match(alias: &str, parsed: &str) -> bool {
    normalize_show_name(alias) == normalize_show_name(parsed)
        || normalize_without_possessive(alias) == normalize_without_possessive(parsed)
}

/// Every episode a batch release for `parsed.season` is assumed to contain:
/// `1..=L`, where `L` comes from the catalog entry keyed by the parsed show
/// name as-is, or twelve when there is none.
#[must_use]
pub fn batch_episodes(parsed: &ParsedRelease, catalog: &Catalog) -> BTreeSet<EpisodeKey> {
    let show = parsed.show.as_deref().unwrap_or_default();
    let length = catalog
        .season_length(show, parsed.season)
        .unwrap_or(DEFAULT_SEASON_LENGTH);

    (1..=length)
        .map(|episode| EpisodeKey::new(parsed.season, episode))
        .collect()
}

/// Whether `parsed` is an acceptable release of `target` for `show`: some
/// alias names the same show, the quality is identical, and the episode (or
/// the batch expansion) covers the target.
#[must_use]
pub fn matches(
    show: &TrackedShow,
    target: EpisodeKey,
    parsed: &ParsedRelease,
    catalog: &Catalog,
) -> bool {
    let Some(parsed_show) = parsed.show.as_deref() else {
        return false;
    };
    if !show.names.iter().any(|alias| names_match(alias, parsed_show)) {
        return false;
    }

    if parsed.quality.as_deref() != Some(show.quality.as_str()) {
        return false;
    }

    if parsed.is_batch {
        batch_episodes(parsed, catalog).contains(&target)
    } else {
        parsed.season == target.season && parsed.episode == Some(target.episode)
    }
}
