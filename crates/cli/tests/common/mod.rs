// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared helpers for building throwaway harness projects.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Platform templates that stand in for a real platform CLI.
///
/// `push` prints the fixture's `build.log` and fails when a `fail` file is
/// present; `run` executes the command locally in the working copy.
pub const LOCAL_PLATFORM: &str = r#"
[platform]
init = ""
provision = "true"
set_buildpacks = "true"
commit = "true"
push = "cat build.log; test ! -e fail"
run = "sh -c {command}"
teardown = "true"
"#;

/// A harness project in a temporary directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Empty project with a `deploycheck.toml` holding `config`.
    pub fn new(config: &str) -> Self {
        let project = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        project.write("deploycheck.toml", config);
        project
    }

    /// Project wired to [`LOCAL_PLATFORM`].
    pub fn local() -> Self {
        Self::new(LOCAL_PLATFORM)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn config(&self) -> PathBuf {
        self.path("deploycheck.toml")
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    pub fn fixture(&self, name: &str, file: &str, content: &str) -> &Self {
        self.write(&format!("fixtures/{}/{}", name, file), content)
    }

    pub fn scenario(&self, file: &str, content: &str) -> &Self {
        self.write(&format!("scenarios/{}", file), content)
    }

    pub fn pin(&self, package: &str, version: &str) -> &Self {
        self.write(
            &format!("requirements/{}.txt", package),
            &format!("{}=={}\n", package, version),
        )
    }
}
