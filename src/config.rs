use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub nyaa: NyaaConfig,

    pub parser: ParserConfig,

    pub downloads: DownloadConfig,

    pub qbittorrent: QBittorrentConfig,

    pub scheduler: SchedulerConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Ledger of tracked shows (JSON array).
    pub tracked_shows_file: String,

    /// Known-shows catalog (JSON object keyed by show name).
    pub known_shows_file: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tracked_shows_file: "tracked_shows.json".to_string(),
            known_shows_file: "known_shows.json".to_string(),
            worker_threads: 2,
            event_bus_buffer_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NyaaConfig {
    pub base_url: String,

    /// Nyaa category code, `0_0` is every category.
    pub category: String,

    /// `0` no filter, `1` no remakes, `2` trusted only.
    pub filter: String,

    pub request_timeout_seconds: u64,

    /// Pause between consecutive queries of one scan.
    pub query_delay_ms: u64,
}

impl Default for NyaaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nyaa.si".to_string(),
            category: "0_0".to_string(),
            filter: "0".to_string(),
            request_timeout_seconds: 10,
            query_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParserProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "regex")]
    Regex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub provider: ParserProvider,

    pub api_base: String,

    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    pub temperature: f32,

    pub request_timeout_seconds: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            provider: ParserProvider::OpenAi,
            api_base: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.1,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadHandlerKind {
    /// Hand the magnet link to the desktop's URI handler.
    #[default]
    Open,
    Qbittorrent,
    Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub handler: DownloadHandlerKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QBittorrentConfig {
    pub url: String,

    pub username: String,

    pub password: String,

    pub category: String,
}

impl Default for QBittorrentConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            username: "change-me".to_string(),
            password: "change-me".to_string(),
            category: "anime".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    pub check_interval_minutes: u32,

    pub cron_expression: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval_minutes: 60,
            cron_expression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6790,
            cors_allowed_origins: vec![
                "http://localhost:6790".to_string(),
                "http://127.0.0.1:6790".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("trackarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".trackarr").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.tracked_shows_file.trim().is_empty() {
            anyhow::bail!("general.tracked_shows_file cannot be empty");
        }

        if self.general.known_shows_file.trim().is_empty() {
            anyhow::bail!("general.known_shows_file cannot be empty");
        }

        if self.downloads.handler == DownloadHandlerKind::Qbittorrent
            && self.qbittorrent.url.is_empty()
        {
            anyhow::bail!("qBittorrent URL cannot be empty when it is the download handler");
        }

        if self.scheduler.enabled
            && self.scheduler.check_interval_minutes == 0
            && self.scheduler.cron_expression.is_none()
        {
            anyhow::bail!("Scheduler interval must be > 0 or cron expression must be set");
        }

        if !(0.0..=2.0).contains(&self.parser.temperature) {
            anyhow::bail!("parser.temperature must be between 0 and 2");
        }

        Ok(())
    }

    #[must_use]
    pub fn tracked_shows_path(&self) -> PathBuf {
        PathBuf::from(&self.general.tracked_shows_file)
    }

    #[must_use]
    pub fn known_shows_path(&self) -> PathBuf {
        PathBuf::from(&self.general.known_shows_file)
    }
}
