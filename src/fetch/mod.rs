//! HTTP fetching from the source wiki.
//!
//! Pages are fetched as buffered text; assets are streamed straight to disk.
//! The crawl talks to the wiki through the [`WikiSource`] trait so it can be
//! driven by an in-memory source in tests.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::config::HttpConfig;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
}

/// Read access to the wiki being mirrored.
///
/// Paths are root-relative (`/wiki/Start`) and resolved against the base URL.
#[async_trait]
pub trait WikiSource: Send + Sync {
    /// Base URL every path is appended to.
    fn base_url(&self) -> &str;

    /// Fetch a document as text.
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;

    /// Stream a resource into `dest`, returning the number of bytes written.
    async fn fetch_to_file(&self, path: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Wiki base URL without a trailing slash
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl FetcherConfig {
    pub fn new(base_url: &str, http: &HttpConfig) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeout: Duration::from_secs(http.timeout_seconds),
            user_agent: http.user_agent.clone(),
        }
    }
}

/// Strip a single trailing slash from a base URL.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.strip_suffix('/').unwrap_or(base_url).to_string()
}

/// HTTP implementation of [`WikiSource`].
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("tracwiki-export")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Absolute URL for a wiki path.
    fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        let joined = format!("{}{}", self.config.base_url, path);
        Url::parse(&joined).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    async fn get(&self, path: &str) -> Result<Response, FetchError> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl WikiSource for Fetcher {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let response = self.get(path).await?;
        Ok(response.text().await?)
    }

    async fn fetch_to_file(&self, path: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut response = self.get(path).await?;

        let mut file = fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}
