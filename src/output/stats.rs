//! Crawl statistics computed from visit records
//!
//! This module tallies the final record list and prints the end-of-crawl
//! summary.

use crate::crawler::{AccessLevel, VisitRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Record counts per access level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub no_login_required: usize,
    pub requires_login: usize,
    pub not_accessible: usize,
    pub unknown: usize,

    /// Records whose fetch failed (a subset of `unknown`)
    pub failures: usize,
}

impl LevelCounts {
    /// Tallies a list of records
    pub fn from_records(records: &[VisitRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.access_level {
                AccessLevel::NoLoginRequired => counts.no_login_required += 1,
                AccessLevel::RequiresLogin => counts.requires_login += 1,
                AccessLevel::NotAccessible => counts.not_accessible += 1,
                AccessLevel::Unknown(_) => counts.unknown += 1,
            }
            if record.is_failure() {
                counts.failures += 1;
            }
        }
        counts
    }

    /// Total number of records counted
    pub fn total(&self) -> usize {
        self.no_login_required + self.requires_login + self.not_accessible + self.unknown
    }

    /// (label, count) rows in report order
    pub fn rows(&self) -> [(&'static str, usize); 4] {
        [
            ("no login required", self.no_login_required),
            ("requires login", self.requires_login),
            ("not accessible to regular use", self.not_accessible),
            ("unknown", self.unknown),
        ]
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// The normalized seed address
    pub seed: String,

    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl finished
    pub finished_at: DateTime<Utc>,

    /// Wall-clock duration of the worker phase
    pub elapsed: Duration,

    /// Number of workers used
    pub workers: usize,

    /// Visit budget the crawl ran with
    pub max_pages: usize,

    /// Counts per access level
    pub levels: LevelCounts,

    /// Count of records per HTTP status code
    pub status_breakdown: BTreeMap<u16, usize>,
}

impl CrawlStatistics {
    /// Builds statistics from the frozen record list
    pub fn from_records(
        seed: impl Into<String>,
        records: &[VisitRecord],
        started_at: DateTime<Utc>,
        elapsed: Duration,
        workers: usize,
        max_pages: usize,
    ) -> Self {
        let finished_at = started_at
            + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());

        let mut status_breakdown = BTreeMap::new();
        for status in records.iter().filter_map(|r| r.status) {
            *status_breakdown.entry(status).or_insert(0) += 1;
        }

        Self {
            seed: seed.into(),
            started_at,
            finished_at,
            elapsed,
            workers,
            max_pages,
            levels: LevelCounts::from_records(records),
            status_breakdown,
        }
    }

    /// Total number of pages recorded
    pub fn total_pages(&self) -> usize {
        self.levels.total()
    }

    /// Returns true if the crawl stopped because the budget was spent
    pub fn budget_reached(&self) -> bool {
        self.total_pages() >= self.max_pages
    }

    /// Pages processed per second of wall-clock time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.total_pages() as f64 / secs
    }

    /// Share of the total, as a percentage
    pub fn percentage(&self, count: usize) -> f64 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        (count as f64 / total as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Seed: {}", stats.seed);
    println!(
        "  Started: {}",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Finished: {}",
        stats.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Elapsed: {:.2}s ({:.2} pages/sec, {} workers)",
        stats.elapsed.as_secs_f64(),
        stats.pages_per_second(),
        stats.workers
    );
    println!(
        "  Pages visited: {} of {}{}",
        stats.total_pages(),
        stats.max_pages,
        if stats.budget_reached() {
            " (budget reached)"
        } else {
            ""
        }
    );
    println!();

    println!("Pages by Access Level:");
    for (label, count) in stats.levels.rows() {
        println!("  {}: {} ({:.1}%)", label, count, stats.percentage(count));
    }
    println!();

    if !stats.status_breakdown.is_empty() {
        println!("Status Codes:");
        for (status, count) in &stats.status_breakdown {
            println!("  {}: {}", status, count);
        }
        println!();
    }

    if stats.levels.failures > 0 {
        println!("Failed fetches: {}", stats.levels.failures);
        println!();
    }
}
