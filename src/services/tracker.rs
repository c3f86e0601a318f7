//! User edits of the tracked shows and the known-shows catalog.
//!
//! [`apply_edit`] is pure: it validates one edit against a library snapshot and
//! returns the edited copy with every affected needed ledger recomputed.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::constants::DEFAULT_QUALITY;
use crate::domain::EpisodeKey;
use crate::models::{Catalog, SeasonLengths, ShowForm, TrackedShow};
use crate::tracking::{recompute, recompute_all};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),

    #[error("no tracked show at index {0}")]
    ShowNotFound(usize),

    #[error("catalog entry '{0}' already exists")]
    CatalogEntryExists(String),

    #[error("catalog entry '{0}' not found")]
    CatalogEntryNotFound(String),
}

/// In-memory state shared by every front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub shows: Vec<TrackedShow>,
    pub catalog: Catalog,
}

impl Library {
    /// Builds a library and recomputes every needed ledger, discarding
    /// whatever was stored.
    #[must_use]
    pub fn new(mut shows: Vec<TrackedShow>, catalog: Catalog) -> Self {
        recompute_all(&mut shows, &catalog);
        Self { shows, catalog }
    }

    pub fn show(&self, index: usize) -> Result<&TrackedShow, TrackerError> {
        self.shows.get(index).ok_or(TrackerError::ShowNotFound(index))
    }

    fn show_mut(&mut self, index: usize) -> Result<&mut TrackedShow, TrackerError> {
        self.shows
            .get_mut(index)
            .ok_or(TrackerError::ShowNotFound(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    AddShow(ShowForm),
    UpdateShow { index: usize, form: ShowForm },
    RemoveShow { index: usize },
    /// Forgets every downloaded episode of the show.
    ResetShow { index: usize },
    SetCatalogEntry { name: String, lengths: SeasonLengths },
    RenameCatalogEntry { from: String, to: String },
    RemoveCatalogEntry { name: String },
}

impl Edit {
    /// Whether the edit changes the catalog file (and therefore every show).
    #[must_use]
    pub const fn touches_catalog(&self) -> bool {
        matches!(
            self,
            Self::SetCatalogEntry { .. }
                | Self::RenameCatalogEntry { .. }
                | Self::RemoveCatalogEntry { .. }
        )
    }
}

pub fn apply_edit(library: &Library, edit: Edit) -> Result<Library, TrackerError> {
    let mut next = library.clone();

    match edit {
        Edit::AddShow(form) => {
            let form = validate_form(form)?;
            let mut show = TrackedShow::from_form(form);
            recompute(&mut show, &next.catalog);
            next.shows.push(show);
        }
        Edit::UpdateShow { index, form } => {
            let form = validate_form(form)?;
            let catalog = next.catalog.clone();
            let show = next.show_mut(index)?;
            show.names = form.names;
            show.start_season = form.start_season;
            show.start_episode = form.start_episode;
            show.end_season = form.end_season;
            show.end_episode = form.end_episode;
            show.quality = form.quality;
            recompute(show, &catalog);
        }
        Edit::RemoveShow { index } => {
            next.show(index)?;
            next.shows.remove(index);
        }
        Edit::ResetShow { index } => {
            let catalog = next.catalog.clone();
            let show = next.show_mut(index)?;
            show.downloaded_episodes.clear();
            recompute(show, &catalog);
        }
        Edit::SetCatalogEntry { name, lengths } => {
            let name = validate_catalog_name(&name)?;
            lengths
                .validate()
                .map_err(|e| TrackerError::Validation(e.to_string()))?;
            next.catalog.insert(name, lengths);
            recompute_all(&mut next.shows, &next.catalog);
        }
        Edit::RenameCatalogEntry { from, to } => {
            let to = validate_catalog_name(&to)?;
            if to != from && next.catalog.contains(&to) {
                return Err(TrackerError::CatalogEntryExists(to));
            }
            let entry = next
                .catalog
                .remove(&from)
                .ok_or(TrackerError::CatalogEntryNotFound(from))?;
            next.catalog.insert(to, entry.episodes_per_season);
            recompute_all(&mut next.shows, &next.catalog);
        }
        Edit::RemoveCatalogEntry { name } => {
            if next.catalog.remove(&name).is_none() {
                return Err(TrackerError::CatalogEntryNotFound(name));
            }
            recompute_all(&mut next.shows, &next.catalog);
        }
    }

    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeState {
    Downloaded,
    Needed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeRow {
    pub season: u32,
    pub episode: u32,
    pub absolute: u32,
    pub status: EpisodeState,
}

/// Every downloaded or needed episode of a show in `(season, episode)` order.
/// Downloaded wins when a key is somehow in both ledgers.
#[must_use]
pub fn episode_rows(show: &TrackedShow, catalog: &Catalog) -> Vec<EpisodeRow> {
    let mut states: BTreeMap<EpisodeKey, EpisodeState> = show
        .needed_episodes
        .iter()
        .map(|key| (key, EpisodeState::Needed))
        .collect();
    states.extend(
        show.downloaded_episodes
            .iter()
            .map(|key| (key, EpisodeState::Downloaded)),
    );

    let primary = show.primary_name();
    states
        .into_iter()
        .map(|(key, status)| EpisodeRow {
            season: key.season,
            episode: key.episode,
            absolute: catalog.absolute_episode(primary, key.season, key.episode),
            status,
        })
        .collect()
}

fn validate_form(form: ShowForm) -> Result<ShowForm, TrackerError> {
    let mut seen = HashSet::new();
    let names: Vec<String> = form
        .names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(ToString::to_string)
        .collect();

    if names.is_empty() {
        return Err(TrackerError::Validation(
            "at least one show name is required".to_string(),
        ));
    }

    for (field, value) in [
        ("start_season", form.start_season),
        ("start_episode", form.start_episode),
        ("end_season", form.end_season),
        ("end_episode", form.end_episode),
    ] {
        if value == 0 {
            return Err(TrackerError::Validation(format!(
                "{field} must be a positive number"
            )));
        }
    }

    if form.end_season < form.start_season {
        return Err(TrackerError::Validation(format!(
            "end season {} is before start season {}",
            form.end_season, form.start_season
        )));
    }

    let quality = match form.quality.trim() {
        "" => DEFAULT_QUALITY.to_string(),
        quality => quality.to_string(),
    };

    Ok(ShowForm {
        names,
        quality,
        ..form
    })
}

fn validate_catalog_name(name: &str) -> Result<String, TrackerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::Validation(
            "show name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(names: &[&str], from: (u32, u32), to: (u32, u32)) -> ShowForm {
        ShowForm {
            names: names.iter().map(ToString::to_string).collect(),
            start_season: from.0,
            start_episode: from.1,
            end_season: to.0,
            end_episode: to.1,
            quality: "1080p".to_string(),
        }
    }

    fn library_with_show() -> Library {
        let catalog: Catalog = [("Kaiba".to_string(), SeasonLengths::Uniform(12))]
            .into_iter()
            .collect();
        let library = Library::new(Vec::new(), catalog);
        apply_edit(&library, Edit::AddShow(form(&["Kaiba"], (1, 1), (1, 12)))).unwrap()
    }

    #[test]
    fn add_show_cleans_names_and_fills_needed() {
        let library = Library::default();
        let mut input = form(&["  Frieren ", "", "Frieren", "Sousou no Frieren"], (1, 1), (1, 4));
        input.quality = "  ".to_string();

        let next = apply_edit(&library, Edit::AddShow(input)).unwrap();

        let show = next.show(0).unwrap();
        assert_eq!(show.names, vec!["Frieren", "Sousou no Frieren"]);
        assert_eq!(show.quality, "1080p");
        assert_eq!(show.needed_episodes.len(), 4);
        assert!(show.downloaded_episodes.is_empty());
        assert!(show.last_checked.is_none());
        assert!(library.shows.is_empty());
    }

    #[test]
    fn add_show_rejects_bad_input() {
        let library = Library::default();
        for bad in [
            form(&[" "], (1, 1), (1, 4)),
            form(&["X"], (0, 1), (1, 4)),
            form(&["X"], (1, 1), (1, 0)),
            form(&["X"], (3, 1), (2, 4)),
        ] {
            assert!(matches!(
                apply_edit(&library, Edit::AddShow(bad)),
                Err(TrackerError::Validation(_))
            ));
        }
    }

    #[test]
    fn update_keeps_downloads_and_recomputes() {
        let mut library = library_with_show();
        library.shows[0].downloaded_episodes.insert(1, 2);

        let next = apply_edit(
            &library,
            Edit::UpdateShow {
                index: 0,
                form: form(&["Kaiba"], (1, 1), (1, 3)),
            },
        )
        .unwrap();

        let show = next.show(0).unwrap();
        assert!(show.downloaded_episodes.contains(1, 2));
        assert_eq!(show.needed_episodes.to_pairs(), vec![[1, 1], [1, 3]]);
    }

    #[test]
    fn reset_and_remove_check_index() {
        let library = library_with_show();
        assert_eq!(
            apply_edit(&library, Edit::ResetShow { index: 4 }),
            Err(TrackerError::ShowNotFound(4))
        );

        let mut downloaded = library.clone();
        downloaded.shows[0].downloaded_episodes.insert(1, 1);
        let reset = apply_edit(&downloaded, Edit::ResetShow { index: 0 }).unwrap();
        assert!(reset.shows[0].downloaded_episodes.is_empty());
        assert_eq!(reset.shows[0].needed_episodes.len(), 12);

        let removed = apply_edit(&library, Edit::RemoveShow { index: 0 }).unwrap();
        assert!(removed.shows.is_empty());
    }

    #[test]
    fn catalog_edits_recompute_all_shows() {
        let library = library_with_show();

        let shorter = apply_edit(
            &library,
            Edit::SetCatalogEntry {
                name: " Kaiba ".to_string(),
                lengths: SeasonLengths::Uniform(6),
            },
        )
        .unwrap();
        assert_eq!(shorter.shows[0].needed_episodes.len(), 6);

        let renamed = apply_edit(
            &shorter,
            Edit::RenameCatalogEntry {
                from: "Kaiba".to_string(),
                to: "Kaiba (2008)".to_string(),
            },
        )
        .unwrap();
        assert!(renamed.catalog.contains("Kaiba (2008)"));
        assert_eq!(renamed.shows[0].needed_episodes.len(), 12);

        let removed = apply_edit(
            &renamed,
            Edit::RemoveCatalogEntry {
                name: "Kaiba (2008)".to_string(),
            },
        )
        .unwrap();
        assert!(removed.catalog.is_empty());
    }

    #[test]
    fn catalog_edit_validation() {
        let library = library_with_show();

        assert!(matches!(
            apply_edit(
                &library,
                Edit::SetCatalogEntry {
                    name: String::new(),
                    lengths: SeasonLengths::Uniform(12),
                },
            ),
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            apply_edit(
                &library,
                Edit::SetCatalogEntry {
                    name: "Kaiba".to_string(),
                    lengths: SeasonLengths::PerSeason(vec![12, 0]),
                },
            ),
            Err(TrackerError::Validation(_))
        ));

        let two = apply_edit(
            &library,
            Edit::SetCatalogEntry {
                name: "Other".to_string(),
                lengths: SeasonLengths::Uniform(3),
            },
        )
        .unwrap();
        assert_eq!(
            apply_edit(
                &two,
                Edit::RenameCatalogEntry {
                    from: "Kaiba".to_string(),
                    to: "Other".to_string(),
                },
            ),
            Err(TrackerError::CatalogEntryExists("Other".to_string()))
        );
        assert_eq!(
            apply_edit(
                &two,
                Edit::RemoveCatalogEntry {
                    name: "Missing".to_string(),
                },
            ),
            Err(TrackerError::CatalogEntryNotFound("Missing".to_string()))
        );
    }

    #[test]
    fn episode_rows_merge_both_ledgers() {
        let mut library = library_with_show();
        library.shows[0].downloaded_episodes.insert(1, 1);
        recompute(&mut library.shows[0], &library.catalog);

        let rows = episode_rows(&library.shows[0], &library.catalog);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].status, EpisodeState::Downloaded);
        assert_eq!(rows[1].status, EpisodeState::Needed);
        assert_eq!(rows[11].absolute, 12);
    }

    #[test]
    fn library_new_discards_stored_needed() {
        let mut show = TrackedShow::from_form(form(&["Kaiba"], (1, 1), (1, 2)));
        show.needed_episodes.insert(7, 7);
        let library = Library::new(vec![show], Catalog::new());
        assert_eq!(library.shows[0].needed_episodes.to_pairs(), vec![[1, 1], [1, 2]]);
    }
}
