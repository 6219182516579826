//! Crawler module for page fetching and access classification
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier and its claim protocol
//! - HTTP fetching behind the `PageFetcher` trait
//! - HTML link extraction behind the `LinkExtractor` trait
//! - Access-level classification
//! - The concurrent worker pool and overall crawl coordination

mod classifier;
mod collector;
mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod pool;

pub use classifier::{classify_access, AccessLevel};
pub use collector::{ResultCollector, VisitRecord};
pub use coordinator::{run_crawl, CrawlOutcome, Coordinator};
pub use extractor::{ExtractionError, HtmlLinkExtractor, LinkExtractor};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::{Claim, Frontier};
pub use pool::{PoolReport, WorkerPool};
