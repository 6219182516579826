//! Access-level classification
//!
//! A fixed, order-sensitive string heuristic that guesses what an anonymous
//! visitor runs into on a page. It is approximate by nature: login prompts
//! built with unusual markup are missed, and pages that merely talk about
//! passwords next to any form field are reported as requiring a login.

use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

/// Content tokens that mark a page as an error or denial page
const NOT_ACCESSIBLE_TOKENS: &[&str] = &["404", "not found", "403", "forbidden"];

/// Address fragments that indicate a redirect to a login flow
const LOGIN_URL_TOKENS: &[&str] = &["login", "signin", "auth"];

/// Markup that declares a password input
const PASSWORD_INPUT_MARKERS: &[&str] = &[
    "type=\"password\"",
    "type='password'",
    "type=password",
];

/// Status codes that mean the page is closed to anonymous visitors
const NOT_ACCESSIBLE_STATUSES: &[u16] = &[401, 403, 404];

/// What an anonymous visitor encounters on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// Content is served without any login
    NoLoginRequired,

    /// The page redirects to, or itself is, a login form
    RequiresLogin,

    /// The page is missing or explicitly denied
    NotAccessible,

    /// Nothing matched; carries the status code when one was observed
    Unknown(Option<u16>),
}

impl AccessLevel {
    /// Returns the report label for this level
    pub fn label(&self) -> String {
        match self {
            Self::NoLoginRequired => "no login required".to_string(),
            Self::RequiresLogin => "requires login".to_string(),
            Self::NotAccessible => "not accessible to regular use".to_string(),
            Self::Unknown(Some(code)) => format!("unknown ({})", code),
            Self::Unknown(None) => "unknown".to_string(),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Classifies a fetched page
///
/// Rules, first match wins, evaluated over lower-cased inputs:
///
/// | # | Condition | Verdict |
/// |---|-----------|---------|
/// | 1 | status is 401/403/404, or content mentions "404", "not found", "403", "forbidden" | `NotAccessible` |
/// | 2 | effective URL differs from the requested one and contains "login", "signin" or "auth" | `RequiresLogin` |
/// | 3 | content has a password input, or both "password" and `<input` | `RequiresLogin` |
/// | 4 | status is 200, or no status is available | `NoLoginRequired` |
/// | 5 | anything else | `Unknown(status)` |
///
/// # Arguments
///
/// * `requested` - The URL the crawler asked for
/// * `effective` - The URL the fetcher ended up on
/// * `content` - The raw page content
/// * `status` - The HTTP status, if the fetch backend reports one
///
/// # Example
///
/// ```
/// use access_mapper::crawler::{classify_access, AccessLevel};
/// use url::Url;
///
/// let requested = Url::parse("https://x.test/account").unwrap();
/// let effective = Url::parse("https://x.test/login?next=/account").unwrap();
/// let level = classify_access(&requested, &effective, "<html></html>", Some(200));
/// assert_eq!(level, AccessLevel::RequiresLogin);
/// ```
pub fn classify_access(
    requested: &Url,
    effective: &Url,
    content: &str,
    status: Option<u16>,
) -> AccessLevel {
    let content = content.to_lowercase();
    let requested = requested.as_str().to_lowercase();
    let effective = effective.as_str().to_lowercase();

    if status.is_some_and(|code| NOT_ACCESSIBLE_STATUSES.contains(&code))
        || contains_any(&content, NOT_ACCESSIBLE_TOKENS)
    {
        return AccessLevel::NotAccessible;
    }

    if effective != requested && contains_any(&effective, LOGIN_URL_TOKENS) {
        return AccessLevel::RequiresLogin;
    }

    if contains_any(&content, PASSWORD_INPUT_MARKERS)
        || (content.contains("password") && content.contains("<input"))
    {
        return AccessLevel::RequiresLogin;
    }

    match status {
        None | Some(200) => AccessLevel::NoLoginRequired,
        other => AccessLevel::Unknown(other),
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
