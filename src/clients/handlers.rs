use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use super::DownloadHandler;
use super::qbittorrent::{AddTorrentOptions, QBitClient};

/// Opens the locator with the system's default handler for its URI scheme,
/// usually the desktop torrent client for `magnet:` links.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenHandler;

#[async_trait]
impl DownloadHandler for OpenHandler {
    fn name(&self) -> &str {
        "open"
    }

    async fn trigger(&self, locator: &str) -> Result<()> {
        let target = locator.to_string();
        tokio::task::spawn_blocking(move || open::that_detached(&target))
            .await
            .context("URI handler task panicked")?
            .context("Failed to open locator with the system handler")?;
        info!(event = "download_triggered", handler = "open", "Opened release locator");
        Ok(())
    }
}

/// Sends the locator to qBittorrent.
pub struct QBitHandler {
    client: QBitClient,
    category: String,
}

impl QBitHandler {
    #[must_use]
    pub const fn new(client: QBitClient, category: String) -> Self {
        Self { client, category }
    }
}

#[async_trait]
impl DownloadHandler for QBitHandler {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn trigger(&self, locator: &str) -> Result<()> {
        let options = AddTorrentOptions {
            category: Some(self.category.clone()),
        };
        self.client.add_torrent_url(locator, Some(options)).await?;
        info!(
            event = "download_triggered",
            handler = "qbittorrent",
            category = %self.category,
            "Queued release in qBittorrent"
        );
        Ok(())
    }
}

/// Only records the locator. Useful for dry runs and headless setups.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHandler;

#[async_trait]
impl DownloadHandler for LogHandler {
    fn name(&self) -> &str {
        "log"
    }

    async fn trigger(&self, locator: &str) -> Result<()> {
        info!(event = "download_triggered", handler = "log", locator = %locator, "Release matched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_handler_always_succeeds() {
        let handler = LogHandler;
        assert_eq!(handler.name(), "log");
        assert!(handler.trigger("magnet:?xt=urn:btih:abc").await.is_ok());
    }
}
