//! HTTP page fetching for title lookups
//!
//! Single-tier fetcher built on `reqwest`: one GET per call, bounded timeout,
//! bounded redirects and body size. Bodies are decoded with charset sniffing
//! because retailer pages frequently mis-declare their encoding.

use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

use super::encoding;

/// Errors that can occur during fetching
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Content too large: {0} bytes")]
    ContentTooLarge(usize),
    #[error("Failed to parse URL: {0}")]
    InvalidUrl(String),
}

/// Result of a completed request, whatever its status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The fetched URL (may differ from request due to redirects)
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Content type header, if any
    pub content_type: Option<String>,
    /// Decoded response body
    pub body: String,
    /// Encoding used to decode the body
    pub encoding: &'static str,
    /// Time taken to fetch
    pub fetch_duration: Duration,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Configuration for the page fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_content_size: 5 * 1024 * 1024, // 5 MB
            max_redirects: 10,
        }
    }
}

/// Page fetcher shared by title resolution and short link expansion
#[derive(Debug, Clone)]
pub struct PageFetcher {
    http_client: reqwest::Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a new fetcher
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// GET `url` and decode the body. Non-2xx responses are returned, not errors.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();

        let response = self.http_client.get(url.as_str()).send().await?;

        let status = response.status();
        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_content_size {
                return Err(FetchError::ContentTooLarge(len as usize));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge(bytes.len()));
        }

        let (body, encoding) = encoding::decode_html(&bytes, content_type.as_deref());

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
            encoding: encoding.name(),
            fetch_duration: start.elapsed(),
        })
    }

    /// Follow redirects from `url` and return where they end.
    ///
    /// Tries HEAD first; some shorteners reject it, so falls back to GET.
    pub async fn resolve_final(&self, url: &Url) -> Result<Url, FetchError> {
        if let Ok(response) = self.http_client.head(url.as_str()).send().await {
            if response.status().is_success() {
                return Ok(response.url().clone());
            }
        }

        let response = self.http_client.get(url.as_str()).send().await?;
        Ok(response.url().clone())
    }

    /// Get configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

/// Parse a string into an http(s) URL
pub fn parse_http_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme {}", other))),
    }
}
