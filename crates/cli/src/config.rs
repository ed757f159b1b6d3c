// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario configuration types for TOML scenario files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fixture::{BuildpackRef, WriteMode};

/// Commit message used when a `commit` step names none
pub const DEFAULT_COMMIT_MESSAGE: &str = "deploycheck commit";

fn default_buildpacks() -> Vec<BuildpackRef> {
    vec![BuildpackRef::Default]
}

/// Top-level scenario file
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Name shown in reports and used by `--filter`
    pub name: String,

    /// Fixture directory, relative to the fixtures dir
    pub fixture: String,

    /// Buildpacks in install order (default: `["default"]`)
    #[serde(default = "default_buildpacks")]
    pub buildpacks: Vec<BuildpackRef>,

    /// The deploy is expected to fail
    #[serde(default)]
    pub allow_failure: bool,

    /// Stacks this scenario applies to (empty: all)
    #[serde(default)]
    pub stacks: Vec<String>,

    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// One lifecycle action, tagged by `action`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum StepSpec {
    Deploy {
        #[serde(default)]
        expect: Vec<ExpectSpec>,
    },
    WriteFile {
        path: PathBuf,
        content: String,
        #[serde(default)]
        mode: WriteMode,
    },
    Commit {
        #[serde(default)]
        message: Option<String>,
    },
    Push {
        #[serde(default)]
        expect: Vec<ExpectSpec>,
    },
    Run {
        command: String,
        #[serde(default)]
        expect: Vec<ExpectSpec>,
    },
    SetBuildpacks {
        buildpacks: Vec<BuildpackRef>,
    },
}

impl StepSpec {
    /// Action name as written in scenario files
    pub fn action(&self) -> &'static str {
        match self {
            Self::Deploy { .. } => "deploy",
            Self::WriteFile { .. } => "write_file",
            Self::Commit { .. } => "commit",
            Self::Push { .. } => "push",
            Self::Run { .. } => "run",
            Self::SetBuildpacks { .. } => "set_buildpacks",
        }
    }

    pub fn expectations(&self) -> &[ExpectSpec] {
        match self {
            Self::Deploy { expect } | Self::Push { expect } | Self::Run { expect, .. } => expect,
            _ => &[],
        }
    }
}

/// An expected transcript, tagged by `type`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ExpectSpec {
    /// Literal block, in order
    Contains {
        text: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        raw: bool,
    },
    /// Literal block with `{{*}}`/`{{+}}` wildcards
    Pattern {
        text: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        raw: bool,
    },
    /// Raw regular expression, multi-line mode
    Regex {
        pattern: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        raw: bool,
    },
    /// Text that must not appear
    Absent {
        text: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        raw: bool,
    },
}

impl ExpectSpec {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Contains { name, .. }
            | Self::Pattern { name, .. }
            | Self::Regex { name, .. }
            | Self::Absent { name, .. } => name.as_deref(),
        }
    }

    pub fn raw(&self) -> bool {
        match self {
            Self::Contains { raw, .. }
            | Self::Pattern { raw, .. }
            | Self::Regex { raw, .. }
            | Self::Absent { raw, .. } => *raw,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
