//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the crawl together:
//! - validating the configuration and normalizing the seed
//! - deriving the origin and seeding the frontier
//! - running the worker pool to completion
//! - freezing the collected records and computing statistics
//! - handing the records to the report sink

use crate::config::{validate, Config};
use crate::crawler::collector::{ResultCollector, VisitRecord};
use crate::crawler::extractor::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::pool::WorkerPool;
use crate::output::{sink_for, write_report, CrawlStatistics, ReportSink};
use crate::url::{normalize_url, Origin};
use crate::MapperError;
use chrono::Utc;
use std::sync::Arc;
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// One record per claimed address, in append order
    pub records: Vec<VisitRecord>,

    /// Statistics computed from the records
    pub statistics: CrawlStatistics,

    /// Whether the report sink succeeded
    pub report_written: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator<F = HttpFetcher> {
    config: Arc<Config>,
    seed: Url,
    origin: Origin,
    fetcher: F,
    extractor: Arc<dyn LinkExtractor>,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration valid and HTTP client built
    /// * `Err(MapperError)` - Invalid configuration, invalid seed, or client build failure
    pub fn new(config: Config) -> Result<Self, MapperError> {
        validate(&config)?;
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Self::assemble(config, fetcher)
    }
}

impl<F> Coordinator<F>
where
    F: PageFetcher + Clone + 'static,
{
    /// Creates a coordinator with a custom page fetcher
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, MapperError> {
        validate(&config)?;
        Self::assemble(config, fetcher)
    }

    fn assemble(config: Config, fetcher: F) -> Result<Self, MapperError> {
        let seed = normalize_url(&config.crawl.seed)?;
        let origin = Origin::from_url(&seed)?;
        let extractor = Arc::new(HtmlLinkExtractor::new()?);

        Ok(Self {
            config: Arc::new(config),
            seed,
            origin,
            fetcher,
            extractor,
        })
    }

    /// Replaces the link extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// The normalized seed address
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// The origin the crawl is confined to
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Runs the crawl without writing a report
    pub async fn crawl(&self) -> CrawlOutcome {
        let started_at = Utc::now();
        let max_pages = self.config.crawl.max_pages as usize;
        let workers = self.config.crawl.concurrency as usize;

        tracing::info!(
            "Starting crawl of {} (origin {}, {} workers, budget {} pages)",
            self.seed,
            self.origin,
            workers,
            max_pages
        );

        let frontier = Arc::new(Frontier::new(
            self.seed.clone(),
            self.origin.clone(),
            max_pages,
        ));
        let collector = Arc::new(ResultCollector::new());

        let pool = WorkerPool::new(
            self.fetcher.clone(),
            self.extractor.clone(),
            frontier.clone(),
            collector.clone(),
            workers,
        );
        let report = pool.run().await;

        if frontier.budget_reached() {
            tracing::info!("Page budget of {} reached", max_pages);
        } else {
            tracing::info!("Frontier exhausted");
        }

        // All workers have been joined, so this is normally the last handle
        let records = match Arc::try_unwrap(collector) {
            Ok(collector) => collector.into_records(),
            Err(shared) => shared.snapshot(),
        };

        let statistics = CrawlStatistics::from_records(
            self.seed.as_str(),
            &records,
            started_at,
            report.elapsed,
            report.workers,
            max_pages,
        );

        tracing::info!(
            "Crawl completed: {} pages visited in {:?}",
            records.len(),
            report.elapsed
        );

        CrawlOutcome {
            records,
            statistics,
            report_written: false,
        }
    }

    /// Runs the crawl and writes the configured report
    ///
    /// A report failure is logged as a warning; the outcome still carries
    /// every record.
    pub async fn run(&self) -> CrawlOutcome {
        let sink = sink_for(
            self.config.output.resolved_format(),
            &self.config.output.report_path,
        );
        self.run_with_sink(sink.as_ref()).await
    }

    /// Runs the crawl and writes the report through the given sink
    pub async fn run_with_sink(&self, sink: &dyn ReportSink) -> CrawlOutcome {
        let mut outcome = self.crawl().await;

        match write_report(sink, &outcome.records) {
            Ok(()) => outcome.report_written = true,
            Err(e) => tracing::warn!(
                "Failed to write report to {}: {} (results kept in memory)",
                sink.destination(),
                e
            ),
        }

        outcome
    }
}

/// Runs a complete crawl over HTTP and writes the report
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished (per-page and report failures included)
/// * `Err(MapperError)` - The crawl could not be started
pub async fn run_crawl(config: Config) -> Result<CrawlOutcome, MapperError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{AccessLevel, FetchError, FetchedPage};
    use async_trait::async_trait;
    use tempfile::TempDir;

    #[derive(Clone)]
    struct StaticFetcher;

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            let content = match url.path() {
                "/" => r#"<a href="/about">About</a><a href="https://other.test/">Out</a>"#,
                _ => "<p>about us</p>",
            };
            Ok(FetchedPage {
                effective_url: url.clone(),
                content: content.to_string(),
                status: Some(200),
            })
        }
    }

    fn config_for(seed: &str, report_path: &str) -> Config {
        let mut config = Config::default();
        config.crawl.seed = seed.to_string();
        config.crawl.concurrency = 2;
        config.output.report_path = report_path.to_string();
        config
    }

    #[test]
    fn test_invalid_seed_rejected() {
        let result = Coordinator::with_fetcher(config_for("not a url", "out.csv"), StaticFetcher);
        assert!(result.is_err());

        let result = Coordinator::with_fetcher(config_for("ftp://x.test/", "out.csv"), StaticFetcher);
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_is_normalized() {
        let coordinator = Coordinator::with_fetcher(
            config_for("https://X.TEST/?utm_source=mail#top", "out.csv"),
            StaticFetcher,
        )
        .unwrap();
        assert_eq!(coordinator.seed().as_str(), "https://x.test/");
        assert_eq!(coordinator.origin().host(), "x.test");
    }

    #[tokio::test]
    async fn test_run_writes_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("crawled_urls.csv");
        let config = config_for("https://x.test/", path.to_str().unwrap());

        let coordinator = Coordinator::with_fetcher(config, StaticFetcher).unwrap();
        let outcome = coordinator.run().await;

        assert!(outcome.report_written);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome
            .records
            .iter()
            .all(|r| r.access_level == AccessLevel::NoLoginRequired));
        assert_eq!(outcome.statistics.total_pages(), 2);

        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.contains("https://x.test/about,no login required,200,"));
        assert!(!csv.contains("other.test"));
    }

    #[tokio::test]
    async fn test_report_failure_keeps_results() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no-such-dir").join("out.csv");
        let config = config_for("https://x.test/", path.to_str().unwrap());

        let coordinator = Coordinator::with_fetcher(config, StaticFetcher).unwrap();
        let outcome = coordinator.run().await;

        assert!(!outcome.report_written);
        assert_eq!(outcome.records.len(), 2);
    }
}
