//! Thin HTTP layer shared by the listening and report clients
//!
//! Every call sends one request and maps a non-success status to
//! [`Error::Api`]. There is no retry: a failed call surfaces once.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// How a failed response is turned into a user-facing message
#[derive(Debug, Clone)]
pub struct Failure {
    action: String,
    not_found: Option<String>,
    prefix_detail: bool,
}

impl Failure {
    /// Use the backend `detail` if present, otherwise `action`
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            not_found: None,
            prefix_detail: false,
        }
    }

    /// Message used for 404 responses that carry no `detail`
    pub fn not_found(mut self, message: impl Into<String>) -> Self {
        self.not_found = Some(message.into());
        self
    }

    /// Render as "`action`: detail", falling back to the reason phrase
    pub fn prefixed(mut self) -> Self {
        self.prefix_detail = true;
        self
    }

    pub fn message(&self, status: StatusCode, detail: Option<String>) -> String {
        if self.prefix_detail {
            let reason = detail
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            return format!("{}: {}", self.action, reason);
        }

        if let Some(detail) = detail {
            return detail;
        }

        match (&self.not_found, status) {
            (Some(message), StatusCode::NOT_FOUND) => message.clone(),
            _ => self.action.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

fn detail_text(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Binary response body plus the headers callers care about
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    pub bytes: Vec<u8>,
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
}

pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, http: &HttpConfig) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Backend URL cannot be used as a base: {}",
                base_url
            )));
        }

        let mut builder = Client::builder().user_agent(http.user_agent.clone());
        if let Some(timeout) = http.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid backend URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        debug!("GET {}", url);
        self.client.get(url)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        debug!("POST {}", url);
        self.client.post(url)
    }

    pub fn put(&self, url: Url) -> RequestBuilder {
        debug!("PUT {}", url);
        self.client.put(url)
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        debug!("DELETE {}", url);
        self.client.delete(url)
    }

    async fn checked(request: RequestBuilder, failure: &Failure) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = failure.message(status, detail_text(&body));
        debug!("Backend returned {}: {}", status, message);
        Err(Error::api(status.as_u16(), message))
    }

    /// Send and decode a JSON body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        failure: Failure,
    ) -> Result<T> {
        let response = Self::checked(request, &failure).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send and ignore the body (e.g. 204 No Content on delete)
    pub async fn send_empty(&self, request: RequestBuilder, failure: Failure) -> Result<()> {
        Self::checked(request, &failure).await?;
        Ok(())
    }

    /// Send and return the raw body
    pub async fn send_binary(
        &self,
        request: RequestBuilder,
        failure: Failure,
    ) -> Result<BinaryResponse> {
        let response = Self::checked(request, &failure).await?;
        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_disposition = header(reqwest::header::CONTENT_DISPOSITION);
        let content_type = header(reqwest::header::CONTENT_TYPE);
        let bytes = response.bytes().await?.to_vec();
        Ok(BinaryResponse {
            bytes,
            content_disposition,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_failure_message_precedence() {
        let failure = Failure::new("Failed to create or update section")
            .not_found("Template with id t1 not found");

        assert_eq!(
            failure.message(StatusCode::NOT_FOUND, None),
            "Template with id t1 not found"
        );
        assert_eq!(
            failure.message(StatusCode::NOT_FOUND, Some("gone".to_string())),
            "gone"
        );
        assert_eq!(
            failure.message(StatusCode::BAD_REQUEST, None),
            "Failed to create or update section"
        );
    }

    #[test]
    fn test_prefixed_failure_falls_back_to_reason() {
        let failure = Failure::new("AI error").prefixed();
        assert_eq!(
            failure.message(StatusCode::BAD_GATEWAY, None),
            "AI error: Bad Gateway"
        );
        assert_eq!(
            failure.message(StatusCode::BAD_GATEWAY, Some("model offline".to_string())),
            "AI error: model offline"
        );
    }

    #[test]
    fn test_detail_text_variants() {
        assert_eq!(detail_text(r#"{"detail":"nope"}"#), Some("nope".to_string()));
        assert_eq!(detail_text(r#"{"detail":null}"#), None);
        assert_eq!(detail_text("<html>oops</html>"), None);
        assert!(detail_text(r#"{"detail":[{"msg":"field required"}]}"#)
            .unwrap()
            .contains("field required"));
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let http = HttpConfig::default();
        let client = BackendClient::new("http://localhost:8000/report", &http).unwrap();
        let url = client.endpoint(&["templates", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/report/templates/a%20b");

        let client = BackendClient::new("http://localhost:8000/report/", &http).unwrap();
        let url = client.endpoint(&["datasources"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/report/datasources");

        let client = BackendClient::new("http://localhost:8000", &http).unwrap();
        let url = client.endpoint(&["user", "words"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/user/words");
    }

    #[tokio::test]
    async fn test_send_json_maps_status_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(serde_json::json!({"detail": "bad id"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri(), &HttpConfig::default()).unwrap();
        let url = client.endpoint(&["things"]).unwrap();
        let err = client
            .send_json::<serde_json::Value>(client.get(url), Failure::new("Failed to fetch things"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(422));
        assert_eq!(err.user_message(), "bad id");
    }
}
