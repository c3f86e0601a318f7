use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

use super::ReleaseSearch;
use crate::config::NyaaConfig;
use crate::models::Candidate;

#[derive(Debug, Clone)]
pub struct NyaaTorrent {
    pub title: String,
    pub info_hash: String,
}

impl NyaaTorrent {
    #[must_use]
    pub fn magnet_link(&self) -> String {
        format!(
            "magnet:?xt=urn:btih:{}&dn={}",
            self.info_hash,
            urlencoding::encode(&self.title)
        )
    }

    /// Rows without a title or an info hash cannot be matched or fetched.
    fn into_candidate(self) -> Option<Candidate> {
        if self.title.trim().is_empty() || self.info_hash.trim().is_empty() {
            return None;
        }
        let locator = self.magnet_link();
        Some(Candidate::new(self.title, locator))
    }
}

/// Consolidates regexes for XML parsing to avoid per-call overhead.
struct NyaaRegex {
    title: Regex,
    info_hash: Regex,
    item: Regex,
}

impl NyaaRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<NyaaRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    title: Regex::new(r"<title>(?:<!\[CDATA\[)?([^<]*?)(?:\]\]>)?</title>").ok()?,
                    info_hash: Regex::new(r"<nyaa:infoHash>([^<]*)</nyaa:infoHash>").ok()?,
                    item: Regex::new(r"(?s)<item>(.*?)</item>").ok()?,
                })
            })
            .as_ref()
    }
}

fn extract_tag(xml: &str, re: &Regex) -> String {
    re.captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn parse_item(item_xml: &str) -> Option<NyaaTorrent> {
    let re = NyaaRegex::get()?;
    Some(NyaaTorrent {
        title: html_escape::decode_html_entities(&extract_tag(item_xml, &re.title)).to_string(),
        info_hash: extract_tag(item_xml, &re.info_hash),
    })
}

fn parse_rss_items(xml: &str) -> Vec<NyaaTorrent> {
    let Some(re) = NyaaRegex::get() else {
        return Vec::new();
    };
    re.item
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .filter_map(|m| parse_item(m.as_str()))
        .collect()
}

/// Nyaa RSS search, most-seeded first.
#[derive(Clone)]
pub struct NyaaClient {
    client: Client,
    base_url: String,
    category: String,
    filter: String,
}

impl NyaaClient {
    /// Creates a `NyaaClient` on top of an existing HTTP client.
    #[must_use]
    pub fn with_shared_client(client: Client, config: &NyaaConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category.clone(),
            filter: config.filter.clone(),
        }
    }

    pub fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/", self.base_url))
            .with_context(|| format!("Invalid Nyaa base URL: {}", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("page", "rss")
            .append_pair("q", query)
            .append_pair("c", &self.category)
            .append_pair("f", &self.filter)
            .append_pair("s", "seeders")
            .append_pair("o", "desc");
        Ok(url)
    }

    pub async fn fetch_rss(&self, url: &str) -> Result<Vec<NyaaTorrent>> {
        let xml = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_rss_items(&xml))
    }
}

#[async_trait]
impl ReleaseSearch for NyaaClient {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        let url = self.search_url(query)?;
        let torrents = self
            .fetch_rss(url.as_str())
            .await
            .with_context(|| format!("Nyaa search failed for '{query}'"))?;

        debug!(query = %query, results = torrents.len(), "Nyaa search complete");
        Ok(torrents
            .into_iter()
            .filter_map(NyaaTorrent::into_candidate)
            .collect())
    }
}
