//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent and timeout
//! - A single GET per URL, following redirects
//! - Folding every transport failure into "no response"
//!
//! The `Transport` trait is the seam the frontier, harvester, and robots gate
//! fetch through, so tests can substitute an in-memory implementation.

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::{header, redirect::Policy, Client};
use url::Url;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// A completed HTTP exchange
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, lowercased; empty if absent
    pub content_type: String,

    /// Response body
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True when the header or the leading markup says this is an HTML page
    ///
    /// The markup check covers servers that send a missing or wrong header.
    pub fn looks_like_html(&self) -> bool {
        if self.content_type.contains("text/html")
            || self.content_type.contains("application/xhtml+xml")
        {
            return true;
        }

        let head = &self.body[..self.body.len().min(512)];
        let head = String::from_utf8_lossy(head);
        let head = head.trim_start_matches('\u{feff}').trim_start().to_lowercase();
        head.starts_with("<!doctype html") || head.starts_with("<html")
    }

    /// True when the Content-Type header names a PDF
    pub fn is_pdf_content_type(&self) -> bool {
        self.content_type.contains("pdf")
    }
}

/// Issues GET requests
///
/// Implementations never return errors: any transport-level failure is
/// `None`, which callers treat the same as a non-200 status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Option<FetchedResponse>;
}

/// `Transport` backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from crawler settings
    ///
    /// # Example
    ///
    /// ```no_run
    /// use corpus_ingest::config::CrawlerConfig;
    /// use corpus_ingest::crawler::HttpFetcher;
    ///
    /// let fetcher = HttpFetcher::new(&CrawlerConfig::default()).unwrap();
    /// ```
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for HttpFetcher {
    async fn get(&self, url: &Url) -> Option<FetchedResponse> {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with the identifying user agent and timeout
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with one GET
///
/// | Condition | Result |
/// |-----------|--------|
/// | Any status, body read | `Some(response)` |
/// | Timeout | `None` |
/// | DNS / connection error | `None` |
/// | Redirect limit exceeded | `None` |
/// | Body read interrupted | `None` |
pub async fn fetch_url(client: &Client, url: &Url) -> Option<FetchedResponse> {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            if e.is_timeout() {
                tracing::debug!("Request timeout for {}", url);
            } else if e.is_connect() {
                tracing::debug!("Connection failed for {}: {}", url, e);
            } else {
                tracing::debug!("Request failed for {}: {}", url, e);
            }
            return None;
        }
    };

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    match response.bytes().await {
        Ok(body) => Some(FetchedResponse {
            status,
            content_type,
            body: body.to_vec(),
        }),
        Err(e) => {
            tracing::debug!("Failed to read body of {}: {}", url, e);
            None
        }
    }
}
