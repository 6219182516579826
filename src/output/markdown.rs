//! Markdown report generation
//!
//! This module renders the visit records as a human-readable markdown
//! document: an access-level breakdown followed by one table row per page.

use crate::crawler::VisitRecord;
use crate::output::stats::LevelCounts;
use crate::output::traits::{ReportResult, ReportSink};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sink that writes a markdown report
#[derive(Debug, Clone)]
pub struct MarkdownReportSink {
    path: PathBuf,
}

impl MarkdownReportSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for MarkdownReportSink {
    fn write(&self, records: &[VisitRecord]) -> ReportResult<()> {
        let markdown = format_markdown_report(records);

        let mut file = File::create(&self.path)?;
        file.write_all(markdown.as_bytes())?;

        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

/// Formats visit records as markdown
///
/// # Arguments
///
/// * `records` - The visit records, in report order
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(records: &[VisitRecord]) -> String {
    let counts = LevelCounts::from_records(records);
    let mut md = String::new();

    md.push_str("# Access-Mapper Report\n\n");

    // Breakdown
    md.push_str("## Access Level Breakdown\n\n");
    md.push_str("| Access Level | Pages |\n");
    md.push_str("|--------------|-------|\n");
    for (label, count) in counts.rows() {
        md.push_str(&format!("| {} | {} |\n", label, count));
    }
    md.push_str(&format!("| **Total** | {} |\n\n", counts.total()));

    if counts.failures > 0 {
        md.push_str(&format!("- **Failed fetches**: {}\n\n", counts.failures));
    }

    // Pages
    md.push_str("## Pages\n\n");
    if records.is_empty() {
        md.push_str("No pages were visited.\n");
        return md;
    }

    md.push_str("| URL | Access Level | Status | Error |\n");
    md.push_str("|-----|--------------|--------|-------|\n");
    for record in records {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(&record.url),
            record.access_level,
            record.status.map(|s| s.to_string()).unwrap_or_default(),
            escape_cell(record.error.as_deref().unwrap_or(""))
        ));
    }

    md
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
