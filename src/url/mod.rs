//! URL handling module for Access-Mapper
//!
//! This module provides URL normalization, domain extraction, link
//! resolution, and the crawl origin used to decide what is in scope.

mod domain;
mod normalize;

pub use domain::extract_domain;
pub use normalize::{normalize_parsed, normalize_url};

use crate::UrlError;
use url::Url;

/// The host a crawl is confined to
///
/// An address is in scope iff its host equals the origin's host exactly.
/// Subdomains, parent domains and other hosts are all out of scope; the port
/// is not considered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    host: String,
}

impl Origin {
    /// Derives the origin from a seed URL
    pub fn from_url(seed: &Url) -> Result<Self, UrlError> {
        extract_domain(seed)
            .map(|host| Self { host })
            .ok_or(UrlError::MissingDomain)
    }

    /// Returns the origin host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if the URL belongs to this origin
    ///
    /// # Examples
    ///
    /// ```
    /// use access_mapper::url::Origin;
    /// use url::Url;
    ///
    /// let origin = Origin::from_url(&Url::parse("https://x.test/").unwrap()).unwrap();
    /// assert!(origin.contains(&Url::parse("https://x.test/login").unwrap()));
    /// assert!(!origin.contains(&Url::parse("https://other.test/").unwrap()));
    /// assert!(!origin.contains(&Url::parse("https://sub.x.test/").unwrap()));
    /// ```
    pub fn contains(&self, url: &Url) -> bool {
        extract_domain(url).is_some_and(|host| host == self.host)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.host)
    }
}

/// Resolves a raw link string against a base URL and normalizes it
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only links (same page anchors)
/// - javascript:, mailto:, tel:, data: schemes
/// - links that fail to resolve
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    normalize_parsed(resolved).ok()
}
