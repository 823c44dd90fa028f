use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the search backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection failure, timeout, or the cluster reporting itself overloaded
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    #[error("Search backend rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::InvalidBody(err.to_string())
        } else {
            BackendError::Unavailable(err.to_string())
        }
    }
}

/// Read-only document search against an index
///
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a `_search` request and return the raw response body
    async fn search(&self, index: &str, body: &Value) -> Result<Value, BackendError>;

    /// Whether the backend is reachable
    async fn ping(&self) -> bool;
}

/// Connection settings for `ElasticsearchClient`
#[derive(Debug, Clone)]
pub struct ElasticsearchOptions {
    pub url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl ElasticsearchOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

/// Elasticsearch REST client
///
/// Holds one pooled `reqwest::Client`; build it once at startup and share it.
/// Connection-level failures are retried up to `max_retries` times, HTTP
/// error responses never are.
pub struct ElasticsearchClient {
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    retry_backoff: Duration,
    client: Client,
}

impl ElasticsearchClient {
    pub fn new(options: ElasticsearchOptions) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| BackendError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: options.url.trim_end_matches('/').to_string(),
            api_key: options.api_key.filter(|key| !key.is_empty()),
            max_retries: options.max_retries,
            retry_backoff: options.retry_backoff,
            client,
        })
    }

    fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url, urlencoding::encode(index))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("ApiKey {}", key)),
            None => builder,
        }
    }

    async fn send_with_retry(&self, url: &str, body: &Value) -> Result<reqwest::Response, BackendError> {
        let mut attempt = 0;
        loop {
            match self.request(reqwest::Method::POST, url).json(body).send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!("Search backend connection failed (attempt {}/{}): {}", attempt, self.max_retries, e);
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) if e.is_timeout() => {
                    return Err(BackendError::Unavailable(format!("Search request timed out: {}", e)));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    async fn search(&self, index: &str, body: &Value) -> Result<Value, BackendError> {
        let url = self.search_url(index);

        tracing::debug!("Searching index {} at {}", index, url);

        let response = self.send_with_retry(&url, body).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Search request failed: {} - {}", status, body);

            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                return Err(BackendError::Unavailable(format!("{}: {}", status, body)));
            }
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // A body that stalls past the timeout is Unavailable, one that fails to parse is InvalidBody
        response.json::<Value>().await.map_err(BackendError::from)
    }

    async fn ping(&self) -> bool {
        match self.request(reqwest::Method::GET, &self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Search backend ping failed: {}", e);
                false
            }
        }
    }
}
