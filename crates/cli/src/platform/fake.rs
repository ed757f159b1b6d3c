// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process scripted platform.
//!
//! `FakePlatform` behaves like a tiny Python buildpack host: it snapshots the
//! working copy on provision and commit, and each push prints a build log
//! whose cache section depends on whether the tracked dependency files
//! changed since the last successful build. Output carries the same noise
//! the real transport adds (ANSI colour, 8-space trailing pads).

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::{AppHandle, Platform, PlatformError, PlatformOutcome};

/// A file with this name in the working copy makes the next build fail.
pub const FAIL_MARKER: &str = ".fake-build-fail";

const PAD: &str = "        ";

#[derive(Debug, Default)]
struct FakeApp {
    buildpacks: Vec<String>,
    committed: BTreeMap<String, String>,
    released: BTreeMap<String, String>,
    cache: Option<BTreeMap<String, String>>,
    releases: u32,
}

#[derive(Debug, Default)]
struct FakeState {
    apps: HashMap<String, FakeApp>,
    calls: Vec<String>,
    destroyed: Vec<String>,
}

/// Scripted [`Platform`] double
#[derive(Debug)]
pub struct FakePlatform {
    tracked: Vec<String>,
    run_outputs: HashMap<String, PlatformOutcome>,
    fail_provision: bool,
    fail_teardown: bool,
    state: Mutex<FakeState>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    /// Tracks `requirements.txt` as the cache key input.
    pub fn new() -> Self {
        Self {
            tracked: vec!["requirements.txt".to_string()],
            run_outputs: HashMap::new(),
            fail_provision: false,
            fail_teardown: false,
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Add a file whose contents feed the build cache key.
    pub fn with_tracked_file(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.tracked.contains(&path) {
            self.tracked.push(path);
        }
        self
    }

    /// Script the outcome of `run(command)`.
    pub fn with_run_output(
        mut self,
        command: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        self.run_outputs
            .insert(command.into(), PlatformOutcome::new(exit_code, output));
        self
    }

    pub fn failing_provision(mut self) -> Self {
        self.fail_provision = true;
        self
    }

    pub fn failing_teardown(mut self) -> Self {
        self.fail_teardown = true;
        self
    }

    /// Every platform call so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Names of apps provisioned and not yet destroyed.
    pub fn live_apps(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().apps.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of apps destroyed, in order.
    pub fn destroyed(&self) -> Vec<String> {
        self.state.lock().destroyed.clone()
    }

    fn record(state: &mut FakeState, call: String) {
        tracing::trace!(call = %call, "fake platform call");
        state.calls.push(call);
    }

    fn build(&self, app: &AppHandle, fake: &mut FakeApp) -> PlatformOutcome {
        let mut out = String::new();
        out.push_str(&format!(
            "remote: -----> Building on the {} stack\n",
            app.stack
        ));
        if !fake.buildpacks.is_empty() {
            out.push_str("remote: -----> Using buildpacks:\n");
            for (i, bp) in fake.buildpacks.iter().enumerate() {
                out.push_str(&format!("remote:        {}. {}\n", i + 1, bp));
            }
        }
        out.push_str("\x1b[1;36mremote: -----> Python app detected\x1b[0m\n");

        if fake.committed.contains_key(FAIL_MARKER) {
            out.push_str(&format!("remote: {}\n", PAD));
            out.push_str("remote: \x1b[1;31m !     Push rejected, failed to compile Python app.\x1b[0m\n");
            out.push_str("remote: \n");
            out.push_str("remote:  !     Push failed\n");
            return PlatformOutcome::new(1, out);
        }

        let digests: BTreeMap<String, String> = self
            .tracked
            .iter()
            .filter_map(|path| {
                fake.committed
                    .get(path)
                    .map(|content| (path.clone(), digest(content)))
            })
            .collect();

        let reuse = match &fake.cache {
            None => false,
            Some(previous) if *previous == digests => {
                out.push_str("remote: -----> Restoring cache\n");
                true
            }
            Some(previous) => {
                out.push_str("remote: -----> Discarding cache since:\n");
                for path in changed_paths(previous, &digests) {
                    out.push_str(&format!("remote:        - The contents of {} changed\n", path));
                }
                false
            }
        };

        let requirements = self.requirements(&fake.committed);
        if !requirements.is_empty() {
            out.push_str("remote: -----> Installing requirements with pip\n");
            for req in &requirements {
                if reuse {
                    out.push_str(&format!("remote:        Requirement already satisfied: {}\n", req));
                } else {
                    out.push_str(&format!("remote:        Collecting {}{}\n", req, PAD));
                }
            }
            if !reuse {
                let installed: Vec<String> = requirements.iter().map(|r| r.replace("==", "-")).collect();
                out.push_str(&format!(
                    "remote:        Successfully installed {}\n",
                    installed.join(" ")
                ));
            }
        }

        fake.releases += 1;
        out.push_str("remote: -----> Discovering process types\n");
        out.push_str(&format!("remote: {}\n", PAD));
        out.push_str("remote: -----> Launching...\n");
        out.push_str(&format!("remote:        Released v{}\n", fake.releases));
        out.push_str("remote: Verifying deploy... done.\n");

        fake.cache = Some(digests);
        fake.released = fake.committed.clone();
        PlatformOutcome::new(0, out)
    }

    fn requirements(&self, files: &BTreeMap<String, String>) -> Vec<String> {
        self.tracked
            .iter()
            .filter_map(|path| files.get(path))
            .flat_map(|content| content.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }
}

impl Platform for FakePlatform {
    fn provision(&self, app: &AppHandle) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("provision {}", app.name));
        if self.fail_provision {
            return Err(PlatformError::CommandFailed {
                step: "provision",
                exit_code: 1,
                output: format!(" !     Name {} is already taken\n", app.name),
            });
        }
        let fake = FakeApp {
            committed: snapshot(&app.work_dir),
            ..FakeApp::default()
        };
        state.apps.insert(app.name.clone(), fake);
        Ok(())
    }

    fn set_buildpacks(&self, app: &AppHandle, buildpacks: &[String]) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        Self::record(
            &mut state,
            format!("set_buildpacks {} {}", app.name, buildpacks.join(",")),
        );
        let fake = state
            .apps
            .get_mut(&app.name)
            .ok_or_else(|| PlatformError::UnknownApp(app.name.clone()))?;
        fake.buildpacks = buildpacks.to_vec();
        Ok(())
    }

    fn commit(&self, app: &AppHandle, _message: &str) -> Result<PlatformOutcome, PlatformError> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("commit {}", app.name));
        let fake = state
            .apps
            .get_mut(&app.name)
            .ok_or_else(|| PlatformError::UnknownApp(app.name.clone()))?;
        fake.committed = snapshot(&app.work_dir);
        Ok(PlatformOutcome::new(0, ""))
    }

    fn push(&self, app: &AppHandle) -> Result<PlatformOutcome, PlatformError> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("push {}", app.name));
        let fake = state
            .apps
            .get_mut(&app.name)
            .ok_or_else(|| PlatformError::UnknownApp(app.name.clone()))?;
        Ok(self.build(app, fake))
    }

    fn run(&self, app: &AppHandle, command: &str) -> Result<PlatformOutcome, PlatformError> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("run {} {}", app.name, command));
        let fake = state
            .apps
            .get(&app.name)
            .ok_or_else(|| PlatformError::UnknownApp(app.name.clone()))?;

        if let Some(outcome) = self.run_outputs.get(command) {
            return Ok(outcome.clone());
        }
        if let Some(path) = command.strip_prefix("cat ") {
            let path = path.trim();
            return Ok(match fake.released.get(path) {
                Some(content) => PlatformOutcome::new(0, content.clone()),
                None => PlatformOutcome::new(1, format!("cat: {}: No such file or directory\n", path)),
            });
        }
        let program = command.split_whitespace().next().unwrap_or(command);
        Ok(PlatformOutcome::new(
            127,
            format!("bash: line 1: {}: command not found\n", program),
        ))
    }

    fn teardown(&self, app: &AppHandle) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("teardown {}", app.name));
        if self.fail_teardown {
            return Err(PlatformError::CommandFailed {
                step: "teardown",
                exit_code: 1,
                output: " !     Internal server error\n".to_string(),
            });
        }
        if state.apps.remove(&app.name).is_none() {
            return Err(PlatformError::UnknownApp(app.name.clone()));
        }
        state.destroyed.push(app.name.clone());
        Ok(())
    }
}

fn digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

fn changed_paths<'a>(
    previous: &'a BTreeMap<String, String>,
    current: &'a BTreeMap<String, String>,
) -> Vec<&'a str> {
    let mut paths: Vec<&str> = previous
        .keys()
        .chain(current.keys())
        .map(String::as_str)
        .filter(|path| previous.get(*path) != current.get(*path))
        .collect();
    paths.sort_unstable();
    paths.dedup();
    paths
}

/// Read every regular file under `root` (skipping `.git`), keyed by relative path.
fn snapshot(root: &Path) -> BTreeMap<String, String> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() || entry.path_is_symlink())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            let content = std::fs::read(entry.path()).ok()?;
            Some((
                relative.to_string_lossy().replace('\\', "/"),
                String::from_utf8_lossy(&content).into_owned(),
            ))
        })
        .collect()
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
