//! Report sink trait and associated error type
//!
//! A sink receives the frozen list of visit records once the crawl has
//! finished and serializes it somewhere. Sinks never see partial results.

use crate::crawler::VisitRecord;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Trait for report sinks
///
/// Implementations write every record, in the order given, and nothing else
/// that could be mistaken for a record.
pub trait ReportSink: Send + Sync {
    /// Serializes all records
    ///
    /// # Arguments
    ///
    /// * `records` - The complete, frozen list of visit records
    fn write(&self, records: &[VisitRecord]) -> ReportResult<()>;

    /// Human-readable destination, used in log messages
    fn destination(&self) -> String;
}
