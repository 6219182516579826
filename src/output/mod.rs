//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Writing the final visit records through a [`ReportSink`]
//! - Choosing the report format (CSV, JSON or Markdown)
//! - Computing and printing crawl statistics

mod csv_output;
mod json_output;
mod markdown;
pub mod stats;
mod traits;

pub use csv_output::{write_csv, CsvReportSink, CSV_HEADERS};
pub use json_output::JsonReportSink;
pub use markdown::{format_markdown_report, MarkdownReportSink};
pub use stats::{print_statistics, CrawlStatistics, LevelCounts};
pub use traits::{ReportError, ReportResult, ReportSink};

use crate::crawler::VisitRecord;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
    Markdown,
}

impl ReportFormat {
    /// Infers the format from a file extension, defaulting to CSV
    ///
    /// ```
    /// use access_mapper::output::ReportFormat;
    ///
    /// assert_eq!(ReportFormat::from_path("out.json"), ReportFormat::Json);
    /// assert_eq!(ReportFormat::from_path("out.md"), ReportFormat::Markdown);
    /// assert_eq!(ReportFormat::from_path("crawled_urls"), ReportFormat::Csv);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Self::Json,
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Csv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown report format '{}' (expected csv, json or markdown)",
                other
            )),
        }
    }
}

/// Builds the sink for a format and destination
pub fn sink_for(format: ReportFormat, path: impl AsRef<Path>) -> Box<dyn ReportSink> {
    match format {
        ReportFormat::Csv => Box::new(CsvReportSink::new(path)),
        ReportFormat::Json => Box::new(JsonReportSink::new(path)),
        ReportFormat::Markdown => Box::new(MarkdownReportSink::new(path)),
    }
}

/// Writes the records through the sink, logging the outcome
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(ReportError)` - The sink failed; the records are untouched
pub fn write_report(sink: &dyn ReportSink, records: &[VisitRecord]) -> ReportResult<()> {
    sink.write(records)?;
    tracing::info!(
        "Wrote {} records to {}",
        records.len(),
        sink.destination()
    );
    Ok(())
}
