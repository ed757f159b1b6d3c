// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deployable fixture apps.
//!
//! A [`FixtureApp`] owns a private working copy of a fixture directory and
//! the platform-side app built from it. Lifecycle:
//!
//! ```text
//! Unprovisioned --deploy--> Deployed --write_file--> Mutated --push--> Deployed
//!        \__________________________________|___________________/
//!                                      teardown --> TornDown
//! ```
//!
//! The platform app is destroyed by [`FixtureApp::teardown`] or, failing
//! that, when the value is dropped.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use deploycheck_capture::CapturedOutput;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use thiserror::Error;
use walkdir::WalkDir;

use crate::platform::{AppHandle, Platform, PlatformError};

/// Errors driving a fixture app
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot {action} while the app is {state}")]
    InvalidTransition { action: &'static str, state: AppState },

    #[error("path '{}' escapes the working copy", .0.display())]
    PathEscape(PathBuf),

    #[error("fixture source '{}' is not a directory", .0.display())]
    MissingSource(PathBuf),

    #[error("deploy failed with exit code {exit_code}")]
    DeployFailure {
        exit_code: i32,
        output: Box<CapturedOutput>,
    },

    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("teardown failed: {0}")]
    Teardown(#[source] PlatformError),
}

impl FixtureError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A buildpack entry; `"default"` stands for the configured buildpack base
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum BuildpackRef {
    Default,
    Named(String),
}

impl BuildpackRef {
    pub fn resolve(&self, base: &str) -> String {
        match self {
            Self::Default => base.to_string(),
            Self::Named(name) => name.clone(),
        }
    }
}

impl From<String> for BuildpackRef {
    fn from(value: String) -> Self {
        if value == "default" {
            Self::Default
        } else {
            Self::Named(value)
        }
    }
}

impl From<&str> for BuildpackRef {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<BuildpackRef> for String {
    fn from(value: BuildpackRef) -> Self {
        match value {
            BuildpackRef::Default => "default".to_string(),
            BuildpackRef::Named(name) => name,
        }
    }
}

/// How `write_file` treats existing content
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Append,
    #[default]
    Overwrite,
}

/// Lifecycle position of a fixture app
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    Unprovisioned,
    Deployed,
    Mutated,
    TornDown,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unprovisioned => "unprovisioned",
            Self::Deployed => "deployed",
            Self::Mutated => "mutated",
            Self::TornDown => "torn down",
        };
        f.write_str(name)
    }
}

/// What to deploy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureSpec {
    /// Fixture directory copied into the working copy
    pub source: PathBuf,
    pub buildpacks: Vec<BuildpackRef>,
    /// A non-zero deploy exit is the expected outcome
    pub allow_failure: bool,
}

/// Harness-wide settings a fixture app needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppSettings {
    pub app_prefix: String,
    pub stack: String,
    pub buildpack_base: String,
}

/// A fixture deployed (or about to be) on a platform
pub struct FixtureApp<'p, P: Platform + ?Sized> {
    platform: &'p P,
    handle: AppHandle,
    buildpacks: Vec<BuildpackRef>,
    buildpack_base: String,
    allow_failure: bool,
    state: AppState,
    provisioned: bool,
    _work: TempDir,
}

impl<'p, P: Platform + ?Sized> FixtureApp<'p, P> {
    /// Copy the fixture into a fresh working copy and name the app.
    ///
    /// Nothing is created on the platform until [`deploy`](Self::deploy).
    pub fn create(
        platform: &'p P,
        spec: &FixtureSpec,
        settings: &AppSettings,
    ) -> Result<Self, FixtureError> {
        if !spec.source.is_dir() {
            return Err(FixtureError::MissingSource(spec.source.clone()));
        }

        let work = tempfile::Builder::new()
            .prefix("deploycheck-")
            .tempdir()
            .map_err(|e| FixtureError::io(&std::env::temp_dir(), e))?;
        copy_tree(&spec.source, work.path())?;

        let handle = AppHandle {
            name: app_name(&settings.app_prefix),
            work_dir: work.path().to_path_buf(),
            stack: settings.stack.clone(),
        };
        tracing::debug!(app = %handle.name, source = %spec.source.display(), "created working copy");

        Ok(Self {
            platform,
            handle,
            buildpacks: spec.buildpacks.clone(),
            buildpack_base: settings.buildpack_base.clone(),
            allow_failure: spec.allow_failure,
            state: AppState::Unprovisioned,
            provisioned: false,
            _work: work,
        })
    }

    pub fn name(&self) -> &str {
        &self.handle.name
    }

    pub fn work_dir(&self) -> &Path {
        &self.handle.work_dir
    }

    pub fn handle(&self) -> &AppHandle {
        &self.handle
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn allow_failure(&self) -> bool {
        self.allow_failure
    }

    /// Buildpack list with the `default` sentinel resolved.
    pub fn resolved_buildpacks(&self) -> Vec<String> {
        self.buildpacks
            .iter()
            .map(|bp| bp.resolve(&self.buildpack_base))
            .collect()
    }

    /// Provision the app, install its buildpacks and push the first build.
    pub fn deploy(&mut self) -> Result<CapturedOutput, FixtureError> {
        self.require("deploy", &[AppState::Unprovisioned])?;

        tracing::info!(app = %self.handle.name, stack = %self.handle.stack, "provisioning");
        self.platform.provision(&self.handle)?;
        self.provisioned = true;

        let buildpacks = self.resolved_buildpacks();
        self.platform.set_buildpacks(&self.handle, &buildpacks)?;

        let outcome = self.platform.push(&self.handle)?;
        self.state = AppState::Deployed;
        self.accept(CapturedOutput::build(outcome.output, outcome.exit_code))
    }

    /// Write into the working copy. Paths must stay inside it.
    pub fn write_file(
        &mut self,
        path: &Path,
        content: &str,
        mode: WriteMode,
    ) -> Result<(), FixtureError> {
        self.require(
            "write a file",
            &[AppState::Unprovisioned, AppState::Deployed, AppState::Mutated],
        )?;
        let target = self.contained(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FixtureError::io(parent, e))?;
        }

        match mode {
            WriteMode::Overwrite => {
                fs::write(&target, content).map_err(|e| FixtureError::io(&target, e))?
            }
            WriteMode::Append => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&target)
                    .map_err(|e| FixtureError::io(&target, e))?;
                file.write_all(content.as_bytes())
                    .map_err(|e| FixtureError::io(&target, e))?;
            }
        }

        if self.state == AppState::Deployed {
            self.state = AppState::Mutated;
        }
        Ok(())
    }

    /// Snapshot the working copy for the next push.
    pub fn commit(&mut self, message: &str) -> Result<(), FixtureError> {
        self.require("commit", &[AppState::Deployed, AppState::Mutated])?;
        self.platform.commit(&self.handle, message)?;
        Ok(())
    }

    /// Rebuild from the last commit.
    pub fn push(&mut self) -> Result<CapturedOutput, FixtureError> {
        self.require("push", &[AppState::Deployed, AppState::Mutated])?;
        let outcome = self.platform.push(&self.handle)?;
        self.state = AppState::Deployed;
        self.accept(CapturedOutput::build(outcome.output, outcome.exit_code))
    }

    /// Run a one-off command. A non-zero exit is captured, not an error.
    pub fn run(&mut self, command: &str) -> Result<CapturedOutput, FixtureError> {
        self.require("run a command", &[AppState::Deployed, AppState::Mutated])?;
        let outcome = self.platform.run(&self.handle, command)?;
        Ok(CapturedOutput::run(outcome.output, outcome.exit_code))
    }

    /// Replace the buildpack list on the existing app.
    pub fn set_buildpacks(&mut self, buildpacks: Vec<BuildpackRef>) -> Result<(), FixtureError> {
        self.require("set buildpacks", &[AppState::Deployed, AppState::Mutated])?;
        let resolved: Vec<String> = buildpacks
            .iter()
            .map(|bp| bp.resolve(&self.buildpack_base))
            .collect();
        self.platform.set_buildpacks(&self.handle, &resolved)?;
        self.buildpacks = buildpacks;
        Ok(())
    }

    /// Destroy the platform app. Calling it again is a no-op.
    pub fn teardown(&mut self) -> Result<(), FixtureError> {
        if self.state == AppState::TornDown {
            return Ok(());
        }
        self.state = AppState::TornDown;
        if !self.provisioned {
            return Ok(());
        }
        tracing::info!(app = %self.handle.name, "tearing down");
        self.platform
            .teardown(&self.handle)
            .map_err(FixtureError::Teardown)
    }

    fn require(&self, action: &'static str, allowed: &[AppState]) -> Result<(), FixtureError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(FixtureError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn accept(&self, output: CapturedOutput) -> Result<CapturedOutput, FixtureError> {
        if output.succeeded() || self.allow_failure {
            Ok(output)
        } else {
            Err(FixtureError::DeployFailure {
                exit_code: output.exit_code(),
                output: Box::new(output),
            })
        }
    }

    fn contained(&self, path: &Path) -> Result<PathBuf, FixtureError> {
        let mut relative = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                _ => return Err(FixtureError::PathEscape(path.to_path_buf())),
            }
        }
        if relative.as_os_str().is_empty() {
            return Err(FixtureError::PathEscape(path.to_path_buf()));
        }
        let target = self.handle.work_dir.join(relative);

        // Symlinks already in the working copy may point anywhere; resolve
        // the deepest existing ancestor and require it to stay inside.
        let root = fs::canonicalize(&self.handle.work_dir)
            .map_err(|e| FixtureError::io(&self.handle.work_dir, e))?;
        let mut existing = target.as_path();
        while fs::symlink_metadata(existing).is_err() {
            match existing.parent() {
                Some(parent) => existing = parent,
                None => break,
            }
        }
        match fs::canonicalize(existing) {
            Ok(resolved) if resolved.starts_with(&root) => Ok(target),
            // Dangling links resolve to nothing we can check.
            _ => Err(FixtureError::PathEscape(path.to_path_buf())),
        }
    }
}

impl<P: Platform + ?Sized> Drop for FixtureApp<'_, P> {
    fn drop(&mut self) {
        if self.state == AppState::TornDown {
            return;
        }
        if let Err(err) = self.teardown() {
            tracing::warn!(app = %self.handle.name, error = %err, "teardown on drop failed");
        }
    }
}

impl<P: Platform + ?Sized> fmt::Debug for FixtureApp<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureApp")
            .field("handle", &self.handle)
            .field("buildpacks", &self.buildpacks)
            .field("allow_failure", &self.allow_failure)
            .field("state", &self.state)
            .finish()
    }
}

/// `<prefix>-<10 random lowercase alphanumerics>`
fn app_name(prefix: &str) -> String {
    let suffix: String = (0..10)
        .map(|_| fastrand::alphanumeric().to_ascii_lowercase())
        .collect();
    format!("{}-{}", prefix, suffix)
}

/// Copy a directory tree, recreating symlinks instead of following them.
fn copy_tree(source: &Path, dest: &Path) -> Result<(), FixtureError> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            FixtureError::Io {
                source: e.into(),
                path,
            }
        })?;
        let relative = match entry.path().strip_prefix(source) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel,
            _ => continue,
        };
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| FixtureError::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| FixtureError::io(entry.path(), e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<(), FixtureError> {
    let points_to = fs::read_link(link).map_err(|e| FixtureError::io(link, e))?;
    std::os::unix::fs::symlink(points_to, target).map_err(|e| FixtureError::io(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<(), FixtureError> {
    fs::copy(link, target)
        .map(|_| ())
        .map_err(|e| FixtureError::io(link, e))
}

#[cfg(test)]
#[path = "fixture_tests.rs"]
mod tests;
