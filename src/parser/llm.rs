//! Chat-completion backed title parser.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{ParseError, TitleParser};
use crate::config::ParserConfig;
use crate::models::{Catalog, ParsedRelease};

/// OpenAI-compatible chat completion client used as a release-title parser.
pub struct OpenAiTitleParser {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiTitleParser {
    /// Reads the API key from the environment variable named in the config.
    /// A missing key is not an error here; every parse then fails with
    /// [`ParseError::NotConfigured`].
    pub fn from_config(config: &ParserConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "No API key set, every release title will fail to parse"
            );
        }

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            timeout,
        })
    }

    async fn complete(&self, system: String, title: &str) -> Result<String, ParseError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ParseError::NotConfigured("no API key".to_string()))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: title.to_string(),
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ParseError::Timeout(self.timeout)
                } else {
                    ParseError::Http(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(ParseError::Api { status, message });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ParseError::Json(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ParseError::MissingField("choices"))
    }
}

#[async_trait]
impl TitleParser for OpenAiTitleParser {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn parse(&self, title: &str, catalog: &Catalog) -> Result<ParsedRelease, ParseError> {
        let raw = self.complete(system_prompt(catalog), title).await?;
        debug!(title = %title, raw = %raw, "Parser response");
        parse_completion(&raw)
    }
}

fn system_prompt(catalog: &Catalog) -> String {
    let known = serde_json::to_string_pretty(catalog).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Extract anime metadata as JSON with:\n\
         - show: normalized title\n\
         - season: number\n\
         - episode: number (null if batch)\n\
         - is_batch: boolean\n\
         - quality: string\n\
         - batch_episodes: array of episode numbers (if batch)\n\
         Rules for {known}\n\
         If season markers are missing, derive season based on episode counts."
    )
}

/// Removes a surrounding Markdown code fence, if any.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.split_once("```").map_or(rest, |(body, _)| body).trim()
}

/// Interprets the model's reply. Numeric fields may arrive as numbers or
/// numeric strings; a missing or null season means season 1.
pub(crate) fn parse_completion(raw: &str) -> Result<ParsedRelease, ParseError> {
    let value: Value =
        serde_json::from_str(strip_fence(raw)).map_err(|e| ParseError::Json(format!("{e}: {raw}")))?;
    let Value::Object(fields) = value else {
        return Err(ParseError::Json(format!("expected an object: {raw}")));
    };

    let show = fields
        .get("show")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|show| !show.is_empty())
        .map(ToString::to_string);

    let season = match fields.get("season") {
        None | Some(Value::Null) => 1,
        Some(value) => coerce_number(value).ok_or_else(|| {
            ParseError::Json(format!("season is not a number: {value}"))
        })?,
    };

    let episode = match fields.get("episode") {
        None | Some(Value::Null) => None,
        Some(value) => Some(coerce_number(value).ok_or_else(|| {
            ParseError::Json(format!("episode is not a number: {value}"))
        })?),
    };

    let is_batch = fields
        .get("is_batch")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let quality = fields
        .get("quality")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|quality| !quality.is_empty())
        .map(ToString::to_string);

    Ok(ParsedRelease {
        show,
        season,
        episode,
        is_batch,
        quality,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeasonLengths;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"show\": \"Frieren\", \"season\": 1, \"episode\": 5, \"is_batch\": false, \"quality\": \"1080p\"}\n```";
        let parsed = parse_completion(raw).unwrap();
        assert_eq!(parsed, ParsedRelease::episode("Frieren", 1, 5, "1080p"));
    }

    #[test]
    fn coerces_numeric_strings_and_defaults_season() {
        let parsed =
            parse_completion(r#"{"show": "Frieren", "episode": "07", "quality": "720p"}"#).unwrap();
        assert_eq!(parsed.season, 1);
        assert_eq!(parsed.episode, Some(7));
        assert!(!parsed.is_batch);

        let parsed = parse_completion(r#"{"show": "Frieren", "season": "2", "episode": 3.0}"#)
            .unwrap();
        assert_eq!(parsed.season, 2);
        assert_eq!(parsed.episode, Some(3));
        assert_eq!(parsed.quality, None);
    }

    #[test]
    fn batch_reply_has_no_episode() {
        let parsed = parse_completion(
            r#"{"show": "Vinland Saga", "season": 2, "episode": null, "is_batch": true,
                "quality": "1080p", "batch_episodes": [1, 2, 3]}"#,
        )
        .unwrap();
        assert_eq!(parsed, ParsedRelease::batch("Vinland Saga", 2, "1080p"));
    }

    #[test]
    fn rejects_non_json_and_bad_numbers() {
        assert!(matches!(
            parse_completion("I could not parse that"),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"show": "X", "season": "two"}"#),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(parse_completion("[1, 2]"), Err(ParseError::Json(_))));
    }

    #[test]
    fn prompt_embeds_catalog() {
        let catalog: Catalog = [("Frieren".to_string(), SeasonLengths::PerSeason(vec![28]))]
            .into_iter()
            .collect();
        let prompt = system_prompt(&catalog);
        assert!(prompt.contains("\"Frieren\""));
        assert!(prompt.contains("derive season based on episode counts"));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let config = ParserConfig {
            api_key_env: "TRACKARR_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ParserConfig::default()
        };
        let parser = OpenAiTitleParser::from_config(&config).unwrap();
        let result = parser.parse("[Group] Show - 01", &Catalog::new()).await;
        assert!(matches!(result, Err(ParseError::NotConfigured(_))));
    }
}
