//! Release-title parsing.
//!
//! A [`TitleParser`] turns a free-text release title into a [`ParsedRelease`].
//! Two providers exist: [`llm::OpenAiTitleParser`], which asks a chat-completion
//! model, and [`title::RegexTitleParser`], which recognises common fansub
//! naming patterns offline.

pub mod llm;
pub mod title;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ParserProvider};
use crate::models::{Catalog, ParsedRelease};

pub use llm::OpenAiTitleParser;
pub use title::RegexTitleParser;

/// Per-candidate parse failure. Never aborts a scan; the candidate is skipped.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("missing field `{0}` in parser output")]
    MissingField(&'static str),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("parser not configured: {0}")]
    NotConfigured(String),

    #[error("unrecognized release title: {0}")]
    Unrecognized(String),
}

#[async_trait]
pub trait TitleParser: Send + Sync {
    /// Short provider name for logs.
    fn provider(&self) -> &str;

    /// Parses one release title. `catalog` carries the known season lengths
    /// so the provider can derive a season from absolute numbering.
    async fn parse(&self, title: &str, catalog: &Catalog) -> Result<ParsedRelease, ParseError>;
}

/// Builds the parser selected in `[parser]`.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn TitleParser>> {
    Ok(match config.parser.provider {
        ParserProvider::OpenAi => Arc::new(OpenAiTitleParser::from_config(&config.parser)?),
        ParserProvider::Regex => Arc::new(RegexTitleParser::new()),
    })
}
