// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Last-run outcome per scenario, persisted as JSON.
//!
//! Lets `--only-failures` rerun just the scenarios that failed last time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the status file
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to read status file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse status file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write status file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: Status,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StatusFile {
    scenarios: BTreeMap<String, StatusEntry>,
}

/// Scenario outcomes keyed by scenario name
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    entries: BTreeMap<String, StatusEntry>,
}

impl StatusStore {
    /// Read the status file. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, StatusError> {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => {
                let file: StatusFile =
                    serde_json::from_str(&content).map_err(|source| StatusError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?;
                file.scenarios
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StatusError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, name: &str, status: Status, source: Option<&Path>) {
        self.entries.insert(
            name.to_string(),
            StatusEntry {
                status,
                recorded_at: Utc::now(),
                source: source.map(Path::to_path_buf),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&StatusEntry> {
        self.entries.get(name)
    }

    /// Names whose last recorded outcome was a failure.
    pub fn failed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.status == Status::Failed)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn is_failed(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.status == Status::Failed)
    }

    /// Write the store, replacing the file atomically.
    pub fn save(&self) -> Result<(), StatusError> {
        let write_err = |source| StatusError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let file = StatusFile {
            scenarios: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| StatusError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        std::io::Write::write_all(&mut tmp, json.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path)
            .map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
