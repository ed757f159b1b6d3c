// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pinned dependency versions.
//!
//! Versions that transcripts mention (pip, setuptools, uv, ...) live in
//! one-pin-per-file stores such as `requirements/pip.txt` containing
//! `pip==25.1.1`, so dependency bots can bump them. The registry reads the
//! whole store once at startup and is read-only afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors resolving pinned versions
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("no pin file for '{package}' (expected {})", path.display())]
    MissingPinFile { package: String, path: PathBuf },

    #[error("malformed pin for '{package}' in {}: expected '{package}==<version>', found '{content}'", path.display())]
    MalformedPin {
        package: String,
        path: PathBuf,
        content: String,
    },

    #[error("failed to read pin store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pin store pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// A single `name==version` pin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionPin {
    pub package: String,
    pub version: String,
}

/// Parse pin file content for `package`.
///
/// Surrounding whitespace is trimmed; the remainder must be exactly
/// `package==version` where the version is non-empty and contains neither
/// whitespace nor a second `==`.
pub fn parse_pin(package: &str, content: &str, path: &Path) -> Result<VersionPin, VersionError> {
    let trimmed = content.trim();
    let malformed = || VersionError::MalformedPin {
        package: package.to_string(),
        path: path.to_path_buf(),
        content: trimmed.to_string(),
    };

    let version = trimmed
        .strip_prefix(package)
        .and_then(|rest| rest.strip_prefix("=="))
        .ok_or_else(malformed)?;

    if version.is_empty() || version.contains("==") || version.contains(char::is_whitespace) {
        return Err(malformed());
    }

    Ok(VersionPin {
        package: package.to_string(),
        version: version.to_string(),
    })
}

/// Path of the pin file for `package` inside `dir`.
pub fn pin_path(dir: &Path, package: &str) -> PathBuf {
    dir.join(format!("{}.txt", package))
}

/// Read and parse a single pin file.
pub fn read_pin(dir: &Path, package: &str) -> Result<VersionPin, VersionError> {
    let path = pin_path(dir, package);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VersionError::MissingPinFile {
                package: package.to_string(),
                path,
            })
        }
        Err(source) => return Err(VersionError::Io { path, source }),
    };
    parse_pin(package, &content, &path)
}

/// Immutable map of package name to pinned version
#[derive(Clone, Debug, Default)]
pub struct VersionRegistry {
    dir: PathBuf,
    pins: BTreeMap<String, String>,
}

impl VersionRegistry {
    /// Load every `*.txt` pin file in `dir`.
    ///
    /// A missing directory yields an empty registry; lookups then fail with
    /// [`VersionError::MissingPinFile`].
    pub fn load(dir: &Path) -> Result<Self, VersionError> {
        let mut pins = BTreeMap::new();
        if dir.is_dir() {
            let pattern = format!("{}/*.txt", glob::Pattern::escape(&dir.to_string_lossy()));
            for entry in glob::glob(&pattern)? {
                let path = entry.map_err(|e| VersionError::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })?;
                let Some(package) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let pin = read_pin(dir, package)?;
                pins.insert(pin.package, pin.version);
            }
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            pins,
        })
    }

    /// Build a registry from known pins (no filesystem access)
    pub fn from_pins<I, K, V>(pins: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            dir: PathBuf::new(),
            pins: pins
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Pinned version for `package`
    pub fn resolve(&self, package: &str) -> Result<&str, VersionError> {
        self.pins
            .get(package)
            .map(String::as_str)
            .ok_or_else(|| VersionError::MissingPinFile {
                package: package.to_string(),
                path: pin_path(&self.dir, package),
            })
    }

    /// All pins, ordered by package name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

#[cfg(test)]
#[path = "versions_tests.rs"]
mod tests;
