use anyhow::{Context, Result, bail};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use tracing::debug;

use crate::config::QBittorrentConfig;

#[derive(Debug, Clone)]
pub struct QBitConfig {
    pub base_url: String,

    pub username: String,

    pub password: String,
}

impl From<&QBittorrentConfig> for QBitConfig {
    fn from(config: &QBittorrentConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddTorrentOptions {
    pub category: Option<String>,
}

/// Minimal qBittorrent Web API client: session login and `torrents/add`.
#[derive(Debug, Clone)]
pub struct QBitClient {
    client: Client,
    config: QBitConfig,
}

impl QBitClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: QBitConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(concat!("Trackarr/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn from_config(config: &QBittorrentConfig) -> Result<Self> {
        Self::new(QBitConfig::from(config))
    }

    pub async fn login(&self) -> Result<()> {
        let url = format!("{}/api/v2/auth/login", self.config.base_url);

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .header("Referer", &self.config.base_url)
            .form(&params)
            .send()
            .await
            .context("Failed to connect to qBittorrent")?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::OK && body.contains("Ok") {
            debug!("Successfully authenticated with qBittorrent");
            Ok(())
        } else if body.contains("Fails") {
            bail!("qBittorrent authentication failed: invalid credentials")
        } else {
            bail!("qBittorrent authentication failed: status={status}, body={body}")
        }
    }

    async fn ensure_auth(&self) -> Result<()> {
        let url = format!("{}/api/v2/app/version", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .header("Referer", &self.config.base_url)
            .send()
            .await
            .context("Failed to connect to qBittorrent")?;

        if response.status() == StatusCode::FORBIDDEN {
            debug!(reason = "session_expired", "Logging in...");
            self.login().await?;
        }

        Ok(())
    }

    /// Adds a torrent by URL; magnet URIs are accepted as-is.
    pub async fn add_torrent_url(
        &self,
        url: &str,
        options: Option<AddTorrentOptions>,
    ) -> Result<()> {
        self.ensure_auth().await?;

        let api_url = format!("{}/api/v2/torrents/add", self.config.base_url);
        let opts = options.unwrap_or_default();

        let mut form: HashMap<&str, String> = HashMap::new();
        form.insert("urls", url.to_string());

        if let Some(cat) = opts.category.filter(|c| !c.is_empty()) {
            form.insert("category", cat);
        }

        let response = self
            .client
            .post(&api_url)
            .header("Referer", &self.config.base_url)
            .form(&form)
            .send()
            .await
            .context("Failed to add torrent")?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::OK {
            debug!("Torrent added successfully");
            Ok(())
        } else if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            bail!("Torrent file is not valid")
        } else {
            bail!("Failed to add torrent: status={status}, body={body}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_section_trims_trailing_slash() {
        let section = QBittorrentConfig {
            url: "http://seedbox:8080/".to_string(),
            ..QBittorrentConfig::default()
        };
        assert_eq!(QBitConfig::from(&section).base_url, "http://seedbox:8080");
    }

    #[tokio::test]
    async fn adding_to_unreachable_server_fails() {
        let client = QBitClient::new(QBitConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            username: "admin".to_string(),
            password: "adminadmin".to_string(),
        })
        .unwrap();
        let result = client.add_torrent_url("magnet:?xt=urn:btih:00", None).await;
        assert!(result.is_err());
    }
}
