//! Flat-file persistence for the tracked-shows ledger and the known-shows
//! catalog.
//!
//! Both files are JSON. Loading is tolerant: a missing or unreadable file
//! yields an empty collection and a log line, never an error. Saving writes a
//! sibling temporary file and renames it over the target so a crash never
//! leaves a half-written ledger behind.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{Catalog, TrackedShow};

/// Where scan progress is persisted after every ledger change.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn save_shows(&self, shows: &[TrackedShow]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct Store {
    shows_path: PathBuf,
    catalog_path: PathBuf,
}

impl Store {
    pub fn new(shows_path: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            shows_path: shows_path.into(),
            catalog_path: catalog_path.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tracked_shows_path(), config.known_shows_path())
    }

    #[must_use]
    pub fn shows_path(&self) -> &Path {
        &self.shows_path
    }

    #[must_use]
    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    /// Tracked shows as stored. `needed_episodes` is whatever the file holds;
    /// callers recompute it against the catalog.
    pub async fn load_shows(&self) -> Vec<TrackedShow> {
        load_or_default(&self.shows_path, "tracked shows").await
    }

    pub async fn load_catalog(&self) -> Catalog {
        load_or_default(&self.catalog_path, "known shows").await
    }

    pub async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        write_json_atomic(&self.catalog_path, catalog).await?;
        debug!(path = %self.catalog_path.display(), entries = catalog.len(), "Saved known shows");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for Store {
    async fn save_shows(&self, shows: &[TrackedShow]) -> Result<()> {
        write_json_atomic(&self.shows_path, shows).await?;
        debug!(path = %self.shows_path.display(), shows = shows.len(), "Saved tracked shows");
        Ok(())
    }
}

async fn load_or_default<T>(path: &Path, what: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No {what} file, starting empty");
            return T::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read {what} file, starting empty");
            return T::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed {what} file, starting empty");
            T::default()
        }
    }
}

async fn write_json_atomic<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

    tokio::fs::write(&tmp, content)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}
