// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Captured output of a single lifecycle action.

use serde::{Deserialize, Serialize};

/// Which phase of the app lifecycle produced the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamOrigin {
    /// Build-time output from a deploy or push.
    Build,
    /// Output of a one-off command run against the deployed app.
    Run,
}

impl std::fmt::Display for StreamOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamOrigin::Build => write!(f, "build"),
            StreamOrigin::Run => write!(f, "run"),
        }
    }
}

/// Text captured from one action. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedOutput {
    raw: String,
    origin: StreamOrigin,
    exit_code: i32,
}

impl CapturedOutput {
    /// Capture build-time output.
    pub fn build(raw: impl Into<String>, exit_code: i32) -> Self {
        Self {
            raw: raw.into(),
            origin: StreamOrigin::Build,
            exit_code,
        }
    }

    /// Capture run-time output.
    pub fn run(raw: impl Into<String>, exit_code: i32) -> Self {
        Self {
            raw: raw.into(),
            origin: StreamOrigin::Run,
            exit_code,
        }
    }

    /// The text exactly as the platform returned it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn origin(&self) -> StreamOrigin {
        self.origin
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
