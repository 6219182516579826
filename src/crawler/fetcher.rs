//! Page fetching
//!
//! The traversal core only knows the [`PageFetcher`] trait. The crate ships
//! one implementation, [`HttpFetcher`], which performs plain HTTP GETs with
//! reqwest. Each worker owns its own clone of the fetcher, so anything
//! session-like (cookies, a browser context) stays worker-local.

use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// The state a fetch ended in
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the fetch ended on (after redirects)
    pub effective_url: Url,

    /// Raw page content
    pub content: String,

    /// HTTP status code, when the backend exposes one
    pub status: Option<u16>,
}

/// Why a single fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// Human-readable reason recorded in the report
    pub fn reason(&self) -> String {
        match self {
            Self::Timeout { .. } => "request timeout".to_string(),
            Self::Connect { message, .. } => format!("connection failed: {}", message),
            Self::Request { message, .. } => message.clone(),
            Self::Body { message, .. } => format!("body read failed: {}", message),
        }
    }
}

/// Loads one address and reports where it ended up
///
/// Implementations never panic on network trouble; every failure is a
/// typed [`FetchError`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the given URL
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Plain HTTP fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the fetch configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Successfully built HTTP client
    /// * `Err(reqwest::Error)` - Failed to build client
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self { client })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use access_mapper::config::FetchConfig;
/// use access_mapper::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Sends a GET request and reads the body as text
    ///
    /// Error statuses are not failures here: a 404 page is a perfectly good
    /// fetch result for the classifier.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        let status = response.status().as_u16();
        let effective_url = response.url().clone();

        let content = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchedPage {
            effective_url,
            content,
            status: Some(status),
        })
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_reqwest_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
