#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use trackarr::clients::{DownloadHandler, ReleaseSearch};
use trackarr::db::LedgerStore;
use trackarr::domain::events::ScanEvent;
use trackarr::models::{Candidate, Catalog, ParsedRelease, SeasonLengths, ShowForm, TrackedShow};
use trackarr::parser::{ParseError, TitleParser};
use trackarr::services::{Library, ScanOrchestrator};

/// Search index answering from a fixed query table. Queries listed in
/// `failing` return an error; every query is recorded.
#[derive(Default)]
pub struct FakeSearch {
    results: HashMap<String, Vec<Candidate>>,
    failing: Vec<String>,
    pub queries: Mutex<Vec<String>>,
    /// Cancelled the first time a search runs, if set.
    cancel_on_search: Option<CancellationToken>,
}

impl FakeSearch {
    pub fn with(mut self, query: &str, titles: &[&str]) -> Self {
        self.results.insert(
            query.to_string(),
            titles
                .iter()
                .map(|title| Candidate::new(*title, format!("magnet:{title}")))
                .collect(),
        );
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }

    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_search = Some(token);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReleaseSearch for FakeSearch {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(token) = &self.cancel_on_search {
            token.cancel();
        }
        if self.failing.iter().any(|q| q == query) {
            bail!("index unavailable");
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

/// Parser answering from a title table; unknown titles fail to parse.
#[derive(Default)]
pub struct FakeParser {
    parsed: HashMap<String, ParsedRelease>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeParser {
    pub fn with(mut self, title: &str, parsed: ParsedRelease) -> Self {
        self.parsed.insert(title.to_string(), parsed);
        self
    }
}

#[async_trait]
impl TitleParser for FakeParser {
    fn provider(&self) -> &str {
        "fake"
    }

    async fn parse(&self, title: &str, _catalog: &Catalog) -> Result<ParsedRelease, ParseError> {
        self.calls.lock().unwrap().push(title.to_string());
        self.parsed
            .get(title)
            .cloned()
            .ok_or_else(|| ParseError::Unrecognized(title.to_string()))
    }
}

#[derive(Default)]
pub struct RecordingHandler {
    fail: bool,
    pub triggered: Mutex<Vec<String>>,
}

impl RecordingHandler {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn triggered(&self) -> Vec<String> {
        self.triggered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadHandler for RecordingHandler {
    fn name(&self) -> &str {
        "recording"
    }

    async fn trigger(&self, locator: &str) -> Result<()> {
        self.triggered.lock().unwrap().push(locator.to_string());
        if self.fail {
            bail!("handler refused");
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub saves: Mutex<Vec<Vec<TrackedShow>>>,
    /// When set, each save records whether `library` was write-locked.
    library: Option<Arc<RwLock<Library>>>,
    saved_under_lock: Mutex<Vec<bool>>,
}

impl MemoryStore {
    pub fn watching(library: Arc<RwLock<Library>>) -> Self {
        Self {
            library: Some(library),
            ..Self::default()
        }
    }

    pub fn saved_under_lock(&self) -> Vec<bool> {
        self.saved_under_lock.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_saved(&self) -> Option<Vec<TrackedShow>> {
        self.saves.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save_shows(&self, shows: &[TrackedShow]) -> Result<()> {
        if let Some(library) = &self.library {
            let locked = library.try_read().is_err();
            self.saved_under_lock.lock().unwrap().push(locked);
        }
        self.saves.lock().unwrap().push(shows.to_vec());
        Ok(())
    }
}

pub fn show(names: &[&str], from: (u32, u32), to: (u32, u32)) -> TrackedShow {
    TrackedShow::from_form(ShowForm {
        names: names.iter().map(ToString::to_string).collect(),
        start_season: from.0,
        start_episode: from.1,
        end_season: to.0,
        end_episode: to.1,
        quality: "1080p".to_string(),
    })
}

pub fn catalog(entries: &[(&str, SeasonLengths)]) -> Catalog {
    entries
        .iter()
        .map(|(name, lengths)| ((*name).to_string(), lengths.clone()))
        .collect()
}

pub struct Harness {
    pub library: Arc<RwLock<Library>>,
    pub search: Arc<FakeSearch>,
    pub parser: Arc<FakeParser>,
    pub handler: Arc<RecordingHandler>,
    pub store: Arc<MemoryStore>,
    pub events: broadcast::Receiver<ScanEvent>,
    pub orchestrator: ScanOrchestrator,
}

impl Harness {
    pub fn new(
        shows: Vec<TrackedShow>,
        catalog: Catalog,
        search: FakeSearch,
        parser: FakeParser,
        handler: RecordingHandler,
    ) -> Self {
        let library = Arc::new(RwLock::new(Library::new(shows, catalog)));
        let search = Arc::new(search);
        let parser = Arc::new(parser);
        let handler = Arc::new(handler);
        let store = Arc::new(MemoryStore::watching(Arc::clone(&library)));
        let (tx, events) = broadcast::channel(256);

        let orchestrator = ScanOrchestrator::new(
            Arc::clone(&library),
            search.clone(),
            parser.clone(),
            handler.clone(),
            store.clone(),
            tx,
        );

        Self {
            library,
            search,
            parser,
            handler,
            store,
            events,
            orchestrator,
        }
    }

    pub fn drain_events(&mut self) -> Vec<ScanEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

/// Search that never answers; only cancellation ends a scan using it.
pub struct PendingSearch;

#[async_trait]
impl ReleaseSearch for PendingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<Candidate>> {
        std::future::pending().await
    }
}
