//! The scan worker: walks tracked shows and their needed episodes, searches
//! the content index, parses candidates and moves matched episodes from the
//! needed ledger to the downloaded one.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::scanner::ScanStatus;
use super::tracker::Library;
use crate::clients::{DownloadHandler, ReleaseSearch};
use crate::db::LedgerStore;
use crate::domain::EpisodeKey;
use crate::domain::events::ScanEvent;
use crate::models::{Candidate, Catalog, ParsedRelease, TrackedShow};
use crate::parser::TitleParser;
use crate::tracking::{acquire, batch_episodes, matches, needed_in_order};

/// Which shows a scan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ScanScope {
    #[default]
    All,
    Show(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScanOutcome {
    pub matches: usize,
    pub shows_scanned: usize,
    pub stopped: bool,
}

/// Two query shapes per alias: `Name S02E07 1080p` and `Name S2 - 07 1080p`.
#[must_use]
pub fn build_queries(show: &TrackedShow, key: EpisodeKey) -> Vec<String> {
    let EpisodeKey { season, episode } = key;
    show.names
        .iter()
        .flat_map(|name| {
            [
                format!("{name} S{season:02}E{episode:02} {}", show.quality),
                format!("{name} S{season} - {episode:02} {}", show.quality),
            ]
        })
        .collect()
}

/// A show is identified by its position plus its primary name, so a show
/// that was removed or renamed mid-scan is skipped instead of mutated.
#[derive(Debug, Clone)]
struct ShowRef {
    index: usize,
    primary: String,
}

impl ShowRef {
    fn resolve<'a>(&self, shows: &'a [TrackedShow]) -> Option<&'a TrackedShow> {
        shows
            .get(self.index)
            .filter(|show| show.primary_name() == self.primary)
    }

    fn resolve_mut<'a>(&self, shows: &'a mut [TrackedShow]) -> Option<&'a mut TrackedShow> {
        shows
            .get_mut(self.index)
            .filter(|show| show.primary_name() == self.primary)
    }
}

enum SearchOutcome {
    Found {
        candidate: Candidate,
        parsed: ParsedRelease,
    },
    NotFound,
    Cancelled,
}

#[derive(Debug, Default)]
struct ShowResult {
    matches: usize,
    acquired: usize,
}

pub struct ScanOrchestrator {
    library: Arc<RwLock<Library>>,
    search: Arc<dyn ReleaseSearch>,
    parser: Arc<dyn TitleParser>,
    handler: Arc<dyn DownloadHandler>,
    store: Arc<dyn LedgerStore>,
    events: broadcast::Sender<ScanEvent>,
    status: Option<Arc<RwLock<ScanStatus>>>,
    query_delay: Duration,
}

impl ScanOrchestrator {
    pub fn new(
        library: Arc<RwLock<Library>>,
        search: Arc<dyn ReleaseSearch>,
        parser: Arc<dyn TitleParser>,
        handler: Arc<dyn DownloadHandler>,
        store: Arc<dyn LedgerStore>,
        events: broadcast::Sender<ScanEvent>,
    ) -> Self {
        Self {
            library,
            search,
            parser,
            handler,
            store,
            events,
            status: None,
            query_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    /// Publishes the show and episode being checked into `status`.
    #[must_use]
    pub fn with_status(mut self, status: Arc<RwLock<ScanStatus>>) -> Self {
        self.status = Some(status);
        self
    }

    fn emit(&self, event: ScanEvent) {
        let _ = self.events.send(event);
    }

    async fn set_progress(&self, show: Option<&str>, episode: Option<EpisodeKey>) {
        if let Some(status) = &self.status {
            let mut status = status.write().await;
            status.current_show = show.map(ToString::to_string);
            status.current_episode = episode.map(|key| key.to_string());
        }
    }

    /// Callers hold the library write guard so saves land in lock order.
    async fn persist(&self, shows: &[TrackedShow]) {
        if let Err(e) = self.store.save_shows(shows).await {
            error!(event = "ledger_save_failed", error = %e, "Failed to persist tracked shows");
            self.emit(ScanEvent::Error {
                message: format!("Failed to save tracked shows: {e}"),
            });
        }
    }

    /// Runs one scan pass to completion or until `cancel` fires.
    ///
    /// The catalog is snapshotted up front; edits made while the scan runs
    /// only affect the next pass.
    pub async fn run(&self, scope: ScanScope, cancel: &CancellationToken) -> ScanOutcome {
        let start = Instant::now();

        let (catalog, targets) = {
            let library = self.library.read().await;
            let targets: Vec<ShowRef> = library
                .shows
                .iter()
                .enumerate()
                .filter(|(index, _)| match scope {
                    ScanScope::All => true,
                    ScanScope::Show(wanted) => *index == wanted,
                })
                .map(|(index, show)| ShowRef {
                    index,
                    primary: show.primary_name().to_string(),
                })
                .collect();
            (library.catalog.clone(), targets)
        };

        if let ScanScope::Show(index) = scope
            && targets.is_empty()
        {
            warn!(index, "Scan requested for a show that does not exist");
        }

        info!(event = "scan_started", shows = targets.len(), "Starting scan");
        self.emit(ScanEvent::ScanStarted {
            shows: targets.len(),
        });

        let mut outcome = ScanOutcome::default();
        for target in &targets {
            if cancel.is_cancelled() {
                info!("Scan stopped by user");
                break;
            }

            if let Some(result) = self.scan_show(target, &catalog, cancel).await {
                outcome.shows_scanned += 1;
                outcome.matches += result.matches;
            }
        }
        outcome.stopped = cancel.is_cancelled();
        self.set_progress(None, None).await;

        metrics::histogram!("scan_duration_seconds").record(start.elapsed().as_secs_f64());
        info!(
            event = "scan_finished",
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            matches = outcome.matches,
            shows_scanned = outcome.shows_scanned,
            stopped = outcome.stopped,
            "Scan finished"
        );
        self.emit(ScanEvent::ScanFinished {
            matches: outcome.matches,
            shows_scanned: outcome.shows_scanned,
            stopped: outcome.stopped,
        });

        outcome
    }

    /// Scans one show in needed order. `None` when the show disappeared or
    /// the scan was cancelled before the show completed.
    async fn scan_show(
        &self,
        target: &ShowRef,
        catalog: &Catalog,
        cancel: &CancellationToken,
    ) -> Option<ShowResult> {
        let needed = {
            let library = self.library.read().await;
            let Some(show) = target.resolve(&library.shows) else {
                warn!(show = %target.primary, "Show changed during scan, skipping");
                self.emit(ScanEvent::Info {
                    message: format!("'{}' changed during the scan and was skipped", target.primary),
                });
                return None;
            };
            needed_in_order(show)
        };

        info!(show = %target.primary, needed = needed.len(), "Scanning show");
        self.emit(ScanEvent::ShowStarted {
            show: target.primary.clone(),
        });

        let mut result = ShowResult::default();
        for key in needed {
            if cancel.is_cancelled() {
                return None;
            }

            // Re-read: an earlier batch match may already have covered `key`.
            let show = {
                let library = self.library.read().await;
                let show = target.resolve(&library.shows)?;
                if !show.needed_episodes.contains(key.season, key.episode) {
                    continue;
                }
                show.clone()
            };

            info!(show = %target.primary, season = key.season, episode = key.episode, "Checking episode");
            self.emit(ScanEvent::EpisodeChecking {
                show: target.primary.clone(),
                season: key.season,
                episode: key.episode,
            });
            self.set_progress(Some(&target.primary), Some(key)).await;

            match self.search_episode(&show, key, catalog, cancel).await {
                SearchOutcome::Found { candidate, parsed } => {
                    let acquired = self.apply_match(target, key, &candidate, &parsed, catalog).await?;
                    result.matches += 1;
                    result.acquired += acquired;
                }
                SearchOutcome::NotFound => {
                    info!(
                        show = %target.primary,
                        season = key.season,
                        episode = key.episode,
                        "Episode not found, assuming later episodes are not out yet"
                    );
                    self.emit(ScanEvent::EpisodeNotFound {
                        show: target.primary.clone(),
                        season: key.season,
                        episode: key.episode,
                    });
                    break;
                }
                SearchOutcome::Cancelled => return None,
            }
        }

        {
            let mut library = self.library.write().await;
            let show = target.resolve_mut(&mut library.shows)?;
            show.last_checked = Some(Local::now().naive_local());
            self.persist(&library.shows).await;
        }

        self.emit(ScanEvent::ShowFinished {
            show: target.primary.clone(),
            acquired: result.acquired,
        });
        Some(result)
    }

    /// Tries every query in order and returns the first candidate that
    /// matches `key`.
    async fn search_episode(
        &self,
        show: &TrackedShow,
        key: EpisodeKey,
        catalog: &Catalog,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        for (i, query) in build_queries(show, key).into_iter().enumerate() {
            if cancel.is_cancelled() {
                return SearchOutcome::Cancelled;
            }
            if i > 0 && !self.query_delay.is_zero() {
                tokio::select! {
                    () = cancel.cancelled() => return SearchOutcome::Cancelled,
                    () = tokio::time::sleep(self.query_delay) => {}
                }
            }

            info!(query = %query, "Trying search query");
            metrics::counter!("search_queries_total").increment(1);
            let searched = tokio::select! {
                () = cancel.cancelled() => return SearchOutcome::Cancelled,
                searched = self.search.search(&query) => searched,
            };
            let candidates = match searched {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(query = %query, error = %e, "Search failed, treating as no results");
                    metrics::counter!("search_failures_total").increment(1);
                    Vec::new()
                }
            };

            if cancel.is_cancelled() {
                return SearchOutcome::Cancelled;
            }

            for candidate in candidates {
                if cancel.is_cancelled() {
                    return SearchOutcome::Cancelled;
                }

                let parsed = tokio::select! {
                    () = cancel.cancelled() => return SearchOutcome::Cancelled,
                    parsed = self.parser.parse(&candidate.title, catalog) => parsed,
                };
                let parsed = match parsed {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!(
                            title = %candidate.title,
                            provider = self.parser.provider(),
                            error = %e,
                            "Failed to parse release title"
                        );
                        metrics::counter!("parse_failures_total").increment(1);
                        continue;
                    }
                };
                debug!(title = %candidate.title, parsed = ?parsed, "Parsed candidate");

                if matches(show, key, &parsed, catalog) {
                    return SearchOutcome::Found { candidate, parsed };
                }
            }
        }
        SearchOutcome::NotFound
    }

    /// Triggers the download once and moves the covered needed episodes.
    /// Returns how many episodes moved, or `None` if the show vanished.
    async fn apply_match(
        &self,
        target: &ShowRef,
        key: EpisodeKey,
        candidate: &Candidate,
        parsed: &ParsedRelease,
        catalog: &Catalog,
    ) -> Option<usize> {
        info!(
            show = %target.primary,
            season = key.season,
            episode = key.episode,
            title = %candidate.title,
            batch = parsed.is_batch,
            "Match found"
        );
        metrics::counter!("release_matches_total").increment(1);

        if let Err(e) = self.handler.trigger(&candidate.locator).await {
            error!(
                handler = self.handler.name(),
                title = %candidate.title,
                error = %e,
                "Download handler failed"
            );
            self.emit(ScanEvent::Error {
                message: format!("Download handler failed for '{}': {e}", candidate.title),
            });
        }

        let moved = {
            let mut library = self.library.write().await;
            let show = target.resolve_mut(&mut library.shows)?;
            let moved = if parsed.is_batch {
                acquire(show, batch_episodes(parsed, catalog))
            } else {
                acquire(show, [key])
            };
            self.persist(&library.shows).await;
            moved
        };

        metrics::counter!("episodes_acquired_total").increment(moved.len() as u64);
        self.emit(ScanEvent::MatchFound {
            show: target.primary.clone(),
            title: candidate.title.clone(),
            season: key.season,
            episode: key.episode,
            batch: parsed.is_batch,
            acquired: moved.iter().map(|k| [k.season, k.episode]).collect(),
        });
        Some(moved.len())
    }
}
