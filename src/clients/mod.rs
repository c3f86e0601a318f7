//! External collaborators of a scan: the content index that is searched and
//! the handler that is given a matching release's locator.

pub mod handlers;
pub mod nyaa;
pub mod qbittorrent;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, DownloadHandlerKind};
use crate::models::Candidate;

pub use handlers::{LogHandler, OpenHandler, QBitHandler};
pub use nyaa::NyaaClient;
pub use qbittorrent::QBitClient;

/// A content index that can be queried with free text.
#[async_trait]
pub trait ReleaseSearch: Send + Sync {
    /// Candidates in the index's own relevance order.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>>;
}

/// Hands a release locator to whatever acquires the content.
#[async_trait]
pub trait DownloadHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn trigger(&self, locator: &str) -> Result<()>;
}

/// Builds the download handler selected in `[downloads]`.
pub fn handler_from_config(config: &Config) -> Result<Arc<dyn DownloadHandler>> {
    Ok(match config.downloads.handler {
        DownloadHandlerKind::Open => Arc::new(OpenHandler),
        DownloadHandlerKind::Qbittorrent => Arc::new(QBitHandler::new(
            QBitClient::from_config(&config.qbittorrent)?,
            config.qbittorrent.category.clone(),
        )),
        DownloadHandlerKind::Log => Arc::new(LogHandler),
    })
}
