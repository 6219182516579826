//! Worker pool - concurrent fetch/classify/extract loop
//!
//! A fixed number of tokio tasks share one [`Frontier`] and one
//! [`ResultCollector`]. Each task repeatedly:
//! 1. waits for the next claimed address
//! 2. fetches it through its own copy of the page fetcher
//! 3. classifies the page and records the verdict
//! 4. extracts, resolves and enqueues same-origin links
//! 5. marks the address complete
//!
//! A failure on one address never leaves the worker that hit it.

use crate::crawler::classifier::classify_access;
use crate::crawler::collector::{ResultCollector, VisitRecord};
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::Frontier;
use crate::url::resolve_link;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// How often (in recorded pages) progress is logged
const PROGRESS_INTERVAL: usize = 10;

/// Statistics about a finished pool run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    /// Number of workers that were started
    pub workers: usize,

    /// Number of addresses processed across all workers
    pub pages_visited: usize,

    /// Wall-clock time the pool ran for
    pub elapsed: Duration,
}

/// Releases a worker's in-flight claim when dropped, including on unwind
struct InFlightGuard<'a> {
    frontier: &'a Frontier,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}

/// Fixed-size pool of crawl workers
pub struct WorkerPool<F> {
    fetcher: F,
    extractor: Arc<dyn LinkExtractor>,
    frontier: Arc<Frontier>,
    collector: Arc<ResultCollector>,
    workers: usize,
}

impl<F> WorkerPool<F>
where
    F: PageFetcher + Clone + 'static,
{
    /// Creates a pool
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Page fetcher; every worker gets its own clone
    /// * `extractor` - Link extractor shared by all workers
    /// * `frontier` - The crawl frontier, already seeded
    /// * `collector` - Where visit records are appended
    /// * `workers` - Number of concurrent workers (at least one is started)
    pub fn new(
        fetcher: F,
        extractor: Arc<dyn LinkExtractor>,
        frontier: Arc<Frontier>,
        collector: Arc<ResultCollector>,
        workers: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            frontier,
            collector,
            workers: workers.max(1),
        }
    }

    /// Runs all workers until the frontier is exhausted or the budget is spent
    pub async fn run(self) -> PoolReport {
        let start_time = Instant::now();
        let mut tasks = JoinSet::new();

        for worker_id in 0..self.workers {
            let fetcher = self.fetcher.clone();
            let extractor = self.extractor.clone();
            let frontier = self.frontier.clone();
            let collector = self.collector.clone();

            tasks.spawn(async move {
                run_worker(worker_id, fetcher, extractor, frontier, collector).await
            });
        }

        let mut pages_visited = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(count) => pages_visited += count,
                Err(e) => tracing::error!("Crawl worker task failed: {}", e),
            }
        }

        let elapsed = start_time.elapsed();
        tracing::debug!(
            "Worker pool finished: {} pages with {} workers in {:?}",
            pages_visited,
            self.workers,
            elapsed
        );

        PoolReport {
            workers: self.workers,
            pages_visited,
            elapsed,
        }
    }
}

/// The per-worker loop; returns the number of addresses this worker processed
async fn run_worker<F: PageFetcher>(
    worker_id: usize,
    fetcher: F,
    extractor: Arc<dyn LinkExtractor>,
    frontier: Arc<Frontier>,
    collector: Arc<ResultCollector>,
) -> usize {
    tracing::debug!("Worker {} started", worker_id);
    let mut processed = 0;

    while let Some(url) = frontier.next().await {
        let _in_flight = InFlightGuard {
            frontier: &frontier,
        };

        let visit = AssertUnwindSafe(visit_url(&fetcher, extractor.as_ref(), &url))
            .catch_unwind()
            .await;

        let (record, links) = match visit {
            Ok(visited) => visited,
            Err(_) => {
                tracing::error!("[W{}] Worker panicked while processing {}", worker_id, url);
                (VisitRecord::failed(url.as_str(), "worker panicked"), Vec::new())
            }
        };

        match &record.error {
            None => tracing::info!("[W{}] {} → {}", worker_id, url, record.access_level),
            Some(reason) => tracing::warn!("[W{}] Error on {}: {}", worker_id, url, reason),
        }

        let recorded = collector.record(record);
        processed += 1;

        let mut queued = 0;
        for link in links {
            if frontier.enqueue(link) {
                queued += 1;
            }
        }
        tracing::debug!("[W{}] Queued {} new links from {}", worker_id, queued, url);

        if let Some(total) = recorded.filter(|total| is_progress_point(*total)) {
            tracing::info!(
                "Progress: {} pages recorded, {} in frontier, {} in flight",
                total,
                frontier.pending_count(),
                frontier.in_flight()
            );
        }
    }

    tracing::debug!("Worker {} finished after {} pages", worker_id, processed);
    processed
}

/// Fetches, classifies and harvests links from one claimed address
///
/// Returns the visit record plus every resolved, normalized link. Scope
/// filtering is left to the frontier.
async fn visit_url<F: PageFetcher>(
    fetcher: &F,
    extractor: &dyn LinkExtractor,
    url: &Url,
) -> (VisitRecord, Vec<Url>) {
    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!("Fetch failed for {}: {}", url, e);
            return (VisitRecord::failed(url.as_str(), e.reason()), Vec::new());
        }
    };

    let access_level = classify_access(url, &page.effective_url, &page.content, page.status);
    let record = VisitRecord::fetched(url.as_str(), access_level, page.status);

    if !should_extract(page.status) {
        return (record, Vec::new());
    }

    let raw_links = match extractor.extract_links(&page.effective_url, &page.content) {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Link extraction failed for {}: {}", url, e);
            Vec::new()
        }
    };

    let links = raw_links
        .iter()
        .filter_map(|href| resolve_link(&page.effective_url, href))
        .collect();

    (record, links)
}

/// Progress is logged once per `PROGRESS_INTERVAL` recorded pages
fn is_progress_point(total: usize) -> bool {
    total > 0 && total % PROGRESS_INTERVAL == 0
}

/// Error responses are not mined for links
fn should_extract(status: Option<u16>) -> bool {
    !status.is_some_and(|code| code >= 400)
}
