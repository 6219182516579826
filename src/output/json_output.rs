//! JSON report sink
//!
//! Writes a pretty-printed array of visit records.

use crate::crawler::VisitRecord;
use crate::output::traits::{ReportResult, ReportSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sink that writes a JSON array
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for JsonReportSink {
    fn write(&self, records: &[VisitRecord]) -> ReportResult<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
