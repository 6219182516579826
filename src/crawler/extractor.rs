//! Link extraction from fetched content
//!
//! Extractors return raw `href` strings exactly as written in the page. They
//! neither resolve relative links nor filter by scope; the worker does both.

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Failure to pull links out of a page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Failed to parse content of {url}: {message}")]
    Parse { url: String, message: String },
}

/// Pulls candidate hyperlinks out of raw page content
pub trait LinkExtractor: Send + Sync {
    /// Returns every link found in `content`, relative or absolute
    ///
    /// # Arguments
    ///
    /// * `base` - The URL the content was served from
    /// * `content` - The raw page content
    fn extract_links(&self, base: &Url, content: &str) -> Result<Vec<String>, ExtractionError>;
}

/// HTML link extractor built on scraper
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - stylesheets, scripts and images
#[derive(Debug, Clone)]
pub struct HtmlLinkExtractor {
    anchor_selector: Selector,
    canonical_selector: Selector,
}

impl HtmlLinkExtractor {
    /// Creates an extractor with the default selectors
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            anchor_selector: parse_selector("a[href]")?,
            canonical_selector: parse_selector("link[rel='canonical'][href]")?,
        })
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, _base: &Url, content: &str) -> Result<Vec<String>, ExtractionError> {
        let document = Html::parse_document(content);
        let mut links = Vec::new();

        for element in document.select(&self.anchor_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                links.push(href.to_string());
            }
        }

        for element in document.select(&self.canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                links.push(href.to_string());
            }
        }

        Ok(links)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
