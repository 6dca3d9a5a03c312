//! Listening practice: a user's vocabulary list and generated audio

mod filter;
mod session;

pub use filter::*;
pub use session::*;

use crate::backend::{BackendClient, Failure};
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

/// A vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub id: Option<String>,
    pub word: String,
    pub count: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Word {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            id: None,
            word: word.into(),
            count,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct WordRecord {
    #[serde(default)]
    id: Option<RawId>,
    word: String,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    last_seen: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WordsResponse {
    words: Vec<WordRecord>,
}

impl From<WordRecord> for Word {
    fn from(record: WordRecord) -> Self {
        Self {
            id: record.id.map(|id| match id {
                RawId::Number(n) => n.to_string(),
                RawId::Text(s) => s,
            }),
            word: record.word,
            count: record.count,
            updated_at: record.last_seen.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Parse a backend timestamp; naive timestamps are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Generated audio as returned by the backend
#[derive(Debug, Clone)]
pub struct PracticeAudio {
    pub bytes: Vec<u8>,
    pub filename: String,
}

fn filename_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?i)filename\s*=\s*"?([^";]+)"?"#).ok())
        .as_ref()
}

/// Extract a safe filename from a Content-Disposition header
pub fn filename_from_disposition(header: Option<&str>, fallback: &str) -> String {
    header
        .and_then(|h| filename_pattern()?.captures(h))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
pub trait PracticeBackend: Send + Sync {
    async fn fetch_words(&self) -> Result<Vec<Word>>;
    async fn generate_practice(&self, words: &[String]) -> Result<PracticeAudio>;
}

pub struct ListenClient {
    backend: BackendClient,
    api_key: Option<String>,
    default_filename: String,
}

impl ListenClient {
    pub fn new(config: &Config, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            backend: BackendClient::new(&config.listen.base_url, &config.http)?,
            api_key: api_key.or_else(|| config.listen_api_key()),
            default_filename: config.listen.default_filename.clone(),
        })
    }
}

#[async_trait]
impl PracticeBackend for ListenClient {
    async fn fetch_words(&self) -> Result<Vec<Word>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::Config("No API key set for the word list (see listen.api_key_env)".to_string())
        })?;

        let url = self.backend.endpoint(&["user", "words"])?;
        let request = self
            .backend
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-API-Key", api_key);

        let response: WordsResponse = self
            .backend
            .send_json(request, Failure::new("Failed to fetch words"))
            .await?;
        info!("Fetched {} words", response.words.len());
        Ok(response.words.into_iter().map(Word::from).collect())
    }

    async fn generate_practice(&self, words: &[String]) -> Result<PracticeAudio> {
        let url = self.backend.endpoint(&["generate_listening_practice"])?;
        let request = self
            .backend
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(words);

        let response = self
            .backend
            .send_binary(request, Failure::new("Failed to generate listening practice"))
            .await?;
        let filename = filename_from_disposition(
            response.content_disposition.as_deref(),
            &self.default_filename,
        );
        info!("Generated {} ({} bytes)", filename, response.bytes.len());
        Ok(PracticeAudio {
            bytes: response.bytes,
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.listen.base_url = server.uri();
        config
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let dt = parse_timestamp("2024-10-09T08:15:30Z").unwrap();
        assert_eq!((dt.year(), dt.hour(), dt.minute()), (2024, 8, 15));

        let dt = parse_timestamp("2024-10-09T08:15:30.123456").unwrap();
        assert_eq!(dt.second(), 30);

        let dt = parse_timestamp("2024-10-09T10:15:30+02:00").unwrap();
        assert_eq!(dt.hour(), 8);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_filename_from_disposition() {
        let fallback = "listening_practice.mp3";
        assert_eq!(
            filename_from_disposition(Some(r#"attachment; filename="drill_01.mp3""#), fallback),
            "drill_01.mp3"
        );
        assert_eq!(
            filename_from_disposition(Some("attachment; filename=plain.mp3"), fallback),
            "plain.mp3"
        );
        assert_eq!(
            filename_from_disposition(Some(r#"attachment; filename="../../etc/passwd""#), fallback),
            "passwd"
        );
        assert_eq!(filename_from_disposition(Some("inline"), fallback), fallback);
        assert_eq!(filename_from_disposition(None, fallback), fallback);
    }

    #[tokio::test]
    async fn test_fetch_words_sends_api_key_and_maps_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/words"))
            .and(header("X-API-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "words": [
                    {"id": 7, "word": "cat", "count": 5, "last_seen": "2024-10-01T12:00:00"},
                    {"id": "w-2", "word": "dog", "count": 1, "last_seen": "garbage"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ListenClient::new(&config_for(&server), Some("secret".to_string())).unwrap();
        let words = client.fetch_words().await.unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].id.as_deref(), Some("7"));
        assert_eq!(words[0].count, 5);
        assert!(words[0].updated_at.is_some());
        assert_eq!(words[1].id.as_deref(), Some("w-2"));
        assert!(words[1].updated_at.is_none());
    }

    #[tokio::test]
    async fn test_fetch_words_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/words"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ListenClient::new(&config_for(&server), Some("bad".to_string())).unwrap();
        let err = client.fetch_words().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_generate_practice_returns_audio_and_filename() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_listening_practice"))
            .and(body_json(serde_json::json!(["cat", "dog"])))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", r#"attachment; filename="cat_dog.mp3""#)
                    .set_body_raw(vec![1u8, 2, 3], "audio/mpeg"),
            )
            .mount(&server)
            .await;

        let client = ListenClient::new(&config_for(&server), None).unwrap();
        let audio = client
            .generate_practice(&["cat".to_string(), "dog".to_string()])
            .await
            .unwrap();
        assert_eq!(audio.filename, "cat_dog.mp3");
        assert_eq!(audio.bytes, vec![1, 2, 3]);
    }
}
