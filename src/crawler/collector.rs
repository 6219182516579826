//! Result collection
//!
//! Workers append one [`VisitRecord`] per claimed address. Records keep the
//! order they were appended in; with more than one worker that order differs
//! from run to run.

use crate::crawler::classifier::AccessLevel;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;

/// The outcome of visiting one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitRecord {
    /// The normalized address that was claimed and fetched
    pub url: String,

    /// Classification verdict
    pub access_level: AccessLevel,

    /// HTTP status code, if the fetch produced one
    pub status: Option<u16>,

    /// Failure reason, if the fetch failed
    pub error: Option<String>,
}

impl VisitRecord {
    /// Creates a record for a successful fetch
    pub fn fetched(url: impl Into<String>, access_level: AccessLevel, status: Option<u16>) -> Self {
        Self {
            url: url.into(),
            access_level,
            status,
            error: None,
        }
    }

    /// Creates a record for a failed fetch
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_level: AccessLevel::Unknown(None),
            status: None,
            error: Some(reason.into()),
        }
    }

    /// Returns true if the fetch for this record failed
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Default)]
struct CollectorState {
    records: Vec<VisitRecord>,
    seen: HashSet<String>,
}

/// Append-only, concurrency-safe list of visit records
#[derive(Debug, Default)]
pub struct ResultCollector {
    state: Mutex<CollectorState>,
}

impl ResultCollector {
    /// Creates an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns the number of records after the append
    ///
    /// Returns `None`, and drops the record, if one already exists for the
    /// same address. The frontier's claim makes that impossible in a normal
    /// crawl.
    pub fn record(&self, record: VisitRecord) -> Option<usize> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.seen.insert(record.url.clone()) {
            tracing::warn!("Duplicate visit record for {} dropped", record.url);
            return None;
        }
        state.records.push(record);
        Some(state.records.len())
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .len()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the records in insertion order
    pub fn snapshot(&self) -> Vec<VisitRecord> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .clone()
    }

    /// Freezes the collector and returns its records in insertion order
    pub fn into_records(self) -> Vec<VisitRecord> {
        self.state
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .records
    }
}
