// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture log implementation.

use crate::duration_serde;
use crate::output::{CapturedOutput, StreamOrigin};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// One capture as stored in the log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Sequence number across the whole log
    pub seq: u64,

    /// Wall-clock timestamp
    pub timestamp: SystemTime,

    /// Elapsed time since the log was created
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,

    /// Scenario that produced the capture
    pub scenario: String,

    /// Lifecycle action label, e.g. `deploy` or `run pip --version`
    pub action: String,

    /// The captured output itself
    pub output: CapturedOutput,
}

/// Ordered, shareable log of captured output.
///
/// Clones share the same underlying storage, so one log can be handed to
/// scenarios running on different threads.
pub struct CaptureLog {
    start: Instant,
    records: Arc<Mutex<Vec<CaptureRecord>>>,
    file_writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl CaptureLog {
    /// Create a new in-memory capture log
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            records: Arc::new(Mutex::new(Vec::new())),
            file_writer: None,
        }
    }

    /// Create a capture log that also writes to a file (JSONL format)
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            start: Instant::now(),
            records: Arc::new(Mutex::new(Vec::new())),
            file_writer: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
        })
    }

    /// Record a capture
    pub fn record(&self, scenario: &str, action: &str, output: &CapturedOutput) {
        let mut records = self.records.lock();
        let record = CaptureRecord {
            seq: records.len() as u64,
            timestamp: SystemTime::now(),
            elapsed: self.start.elapsed(),
            scenario: scenario.to_string(),
            action: action.to_string(),
            output: output.clone(),
        };

        if let Some(ref writer) = self.file_writer {
            use std::io::Write;
            let mut w = writer.lock();
            if let Ok(json) = serde_json::to_string(&record) {
                let _ = writeln!(w, "{}", json);
                let _ = w.flush();
            }
        }

        records.push(record);
    }

    /// Get all records
    pub fn records(&self) -> Vec<CaptureRecord> {
        self.records.lock().clone()
    }

    /// Get the last N records
    pub fn last(&self, n: usize) -> Vec<CaptureRecord> {
        let all = self.records.lock();
        all.iter().rev().take(n).rev().cloned().collect()
    }

    /// Records produced by one scenario, in capture order
    pub fn for_scenario(&self, scenario: &str) -> Vec<CaptureRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.scenario == scenario)
            .cloned()
            .collect()
    }

    /// Records with the given origin
    pub fn by_origin(&self, origin: StreamOrigin) -> Vec<CaptureRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.output.origin() == origin)
            .cloned()
            .collect()
    }

    /// Records whose action exited non-zero
    pub fn failures(&self) -> Vec<CaptureRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| !r.output.succeeded())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Default for CaptureLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CaptureLog {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            records: Arc::clone(&self.records),
            file_writer: self.file_writer.as_ref().map(Arc::clone),
        }
    }
}

impl std::fmt::Debug for CaptureLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureLog")
            .field("len", &self.len())
            .field("file", &self.file_writer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
