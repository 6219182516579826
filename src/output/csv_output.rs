//! CSV report sink
//!
//! Writes one row per visit record with the columns
//! `url,access level,status,error`. Missing values are empty cells.

use crate::crawler::VisitRecord;
use crate::output::traits::{ReportResult, ReportSink};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column headers, in order
pub const CSV_HEADERS: [&str; 4] = ["url", "access level", "status", "error"];

/// Sink that writes a CSV file
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    path: PathBuf,
}

impl CsvReportSink {
    /// Creates a sink writing to the given path (overwritten if present)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Writes the CSV rows for `records` into any writer
pub fn write_csv<W: Write>(writer: W, records: &[VisitRecord]) -> ReportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADERS)?;

    for record in records {
        let status = record.status.map(|s| s.to_string()).unwrap_or_default();
        writer.write_record([
            record.url.as_str(),
            record.access_level.label().as_str(),
            status.as_str(),
            record.error.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

impl ReportSink for CsvReportSink {
    fn write(&self, records: &[VisitRecord]) -> ReportResult<()> {
        let file = File::create(&self.path)?;
        write_csv(file, records)
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
