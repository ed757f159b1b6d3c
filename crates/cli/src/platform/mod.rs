// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The deployment platform seen as a black box.
//!
//! The harness never models the platform's API. It only needs a handful of
//! operations that each return an exit code and text: provision an app,
//! set its buildpacks, push a commit, run a one-off command, destroy it.

mod command;
mod fake;

pub use command::{CommandPlatform, PlatformCommands};
pub use fake::{FakePlatform, FAIL_MARKER};

use std::path::PathBuf;
use thiserror::Error;

/// Errors invoking the platform
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to start {step} command: {source}")]
    Spawn {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed with exit code {exit_code}: {output}")]
    CommandFailed {
        step: &'static str,
        exit_code: i32,
        output: String,
    },

    #[error("unknown app '{0}'")]
    UnknownApp(String),
}

/// Identity of one app on the platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppHandle {
    /// Platform-side app name
    pub name: String,
    /// Local working copy pushed to the app
    pub work_dir: PathBuf,
    /// Stack the app builds on
    pub stack: String,
}

/// Exit code and combined output of one platform operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformOutcome {
    pub exit_code: i32,
    pub output: String,
}

impl PlatformOutcome {
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Operations the harness needs from a deployment platform.
///
/// Calls for one app are made strictly in sequence; implementations must be
/// shareable across threads because independent scenarios may run in
/// parallel.
pub trait Platform: Send + Sync {
    /// Create the app and prepare its working copy for pushing.
    fn provision(&self, app: &AppHandle) -> Result<(), PlatformError>;

    /// Replace the app's buildpack list, in order.
    fn set_buildpacks(&self, app: &AppHandle, buildpacks: &[String]) -> Result<(), PlatformError>;

    /// Snapshot the working copy so the next push picks it up.
    fn commit(&self, app: &AppHandle, message: &str) -> Result<PlatformOutcome, PlatformError>;

    /// Build and release the last commit. Non-zero exit is returned, not an error.
    fn push(&self, app: &AppHandle) -> Result<PlatformOutcome, PlatformError>;

    /// Run a one-off command against the released app.
    fn run(&self, app: &AppHandle, command: &str) -> Result<PlatformOutcome, PlatformError>;

    /// Destroy the app.
    fn teardown(&self, app: &AppHandle) -> Result<(), PlatformError>;
}
