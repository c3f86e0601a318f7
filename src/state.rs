use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tracing::info;

use crate::clients::{self, DownloadHandler, NyaaClient, ReleaseSearch};
use crate::config::Config;
use crate::db::{LedgerStore, Store};
use crate::domain::events::ScanEvent;
use crate::parser::{self, TitleParser};
use crate::services::{
    Edit, Library, ScanController, ScanOrchestrator, ScanStatus, TrackerError, apply_edit,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Trackarr/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// The three seams a scan talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub search: Arc<dyn ReleaseSearch>,
    pub parser: Arc<dyn TitleParser>,
    pub handler: Arc<dyn DownloadHandler>,
}

impl Collaborators {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.nyaa.request_timeout_seconds)?;
        Ok(Self {
            search: Arc::new(NyaaClient::with_shared_client(http_client, &config.nyaa)),
            parser: parser::from_config(config)?,
            handler: clients::handler_from_config(config)?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Rejected(#[from] TrackerError),

    #[error("failed to save: {0}")]
    Persist(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub library: Arc<RwLock<Library>>,

    pub scanner: Arc<ScanController>,

    pub event_bus: broadcast::Sender<ScanEvent>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl SharedState {
    pub async fn new(
        config: Config,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let collaborators = Collaborators::from_config(&config)?;
        Ok(Self::with_collaborators(config, collaborators, prometheus_handle).await)
    }

    /// Loads both files and wires a scan controller around `collaborators`.
    pub async fn with_collaborators(
        config: Config,
        collaborators: Collaborators,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> Self {
        let store = Store::from_config(&config);
        let library = Library::new(store.load_shows().await, store.load_catalog().await);
        info!(
            shows = library.shows.len(),
            catalog_entries = library.catalog.len(),
            "Loaded tracked shows"
        );
        let library = Arc::new(RwLock::new(library));

        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size.max(1));
        let status = Arc::new(RwLock::new(ScanStatus::default()));

        let ledger_store: Arc<dyn LedgerStore> = Arc::new(store.clone());
        let orchestrator = ScanOrchestrator::new(
            Arc::clone(&library),
            collaborators.search,
            collaborators.parser,
            collaborators.handler,
            ledger_store,
            event_bus.clone(),
        )
        .with_query_delay(Duration::from_millis(config.nyaa.query_delay_ms))
        .with_status(Arc::clone(&status));

        let scanner = Arc::new(ScanController::new(orchestrator, status, event_bus.clone()));

        Self {
            config: Arc::new(config),
            store,
            library,
            scanner,
            event_bus,
            prometheus_handle,
        }
    }

    pub async fn snapshot(&self) -> Library {
        self.library.read().await.clone()
    }

    /// Applies one edit, swaps the in-memory library and writes the affected
    /// files. The write lock is held from validation until the files are
    /// written, so neither a running scan's ledger updates nor its saves can
    /// interleave with the edit.
    pub async fn edit(&self, edit: Edit) -> Result<Library, EditError> {
        let touches_catalog = edit.touches_catalog();

        let mut library = self.library.write().await;
        let next = apply_edit(&library, edit)?;
        *library = next.clone();

        self.store.save_shows(&next.shows).await?;
        if touches_catalog {
            self.store.save_catalog(&next.catalog).await?;
        }
        drop(library);
        Ok(next)
    }
}
