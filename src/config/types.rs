use crate::output::ReportFormat;
use serde::Deserialize;

/// Default number of concurrent crawl workers
pub const DEFAULT_CONCURRENCY: u32 = 5;

/// Default page budget for a single crawl
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Main configuration structure for Access-Mapper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl entry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// URL the crawl starts from; its host is the crawl origin
    #[serde(default)]
    pub seed: String,

    /// Number of concurrent fetch workers
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Maximum number of pages ever claimed for fetching
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            concurrency: DEFAULT_CONCURRENCY,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the report file
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,

    /// Report format; inferred from the report path when absent
    #[serde(default)]
    pub format: Option<ReportFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            format: None,
        }
    }
}

impl OutputConfig {
    /// Returns the configured format, falling back to the report path's extension
    pub fn resolved_format(&self) -> ReportFormat {
        self.format
            .unwrap_or_else(|| ReportFormat::from_path(&self.report_path))
    }
}

fn default_concurrency() -> u32 {
    DEFAULT_CONCURRENCY
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_user_agent() -> String {
    format!("access-mapper/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_report_path() -> String {
    "crawled_urls.csv".to_string()
}
