// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario selection and parallel execution for the binary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use deploycheck_capture::CaptureLog;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::Cli;
use crate::harness::{ConfigError, HarnessConfig};
use crate::platform::Platform;
use crate::runner::{Outcome, ScenarioFailure, ScenarioReport, ScenarioRunner};
use crate::scenario::{discover, Scenario, ScenarioError};
use crate::status::{Status, StatusError, StatusStore};
use crate::versions::{VersionError, VersionRegistry};

/// Errors that stop the whole run
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error("failed to open capture log '{}': {source}", .path.display())]
    CaptureLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario name '{name}' is used by both {} and {}", .first.display(), .second.display())]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("scenario task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Selected scenarios and the settings they run with
#[derive(Debug)]
pub struct Suite {
    harness: Arc<HarnessConfig>,
    scenarios: Vec<Arc<Scenario>>,
    status: StatusStore,
}

impl Suite {
    /// Load config, pins and scenarios, then apply `--filter` and `--only-failures`.
    pub fn prepare(cli: &Cli) -> Result<Self, SuiteError> {
        let harness = HarnessConfig::load(cli.config.as_deref())?
            .with_overrides(cli.stack.clone(), cli.buildpack_base.clone());
        harness.validate()?;

        let registry = VersionRegistry::load(&harness.versions_dir)?;
        tracing::debug!(pins = registry.len(), dir = %harness.versions_dir.display(), "loaded version pins");
        let vars = harness.template_vars(&registry);
        let status = StatusStore::load(&harness.status_file)?;

        let paths = scenario_paths(&cli.scenarios, &harness.scenarios_dir)?;
        let mut scenarios = Vec::new();
        let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
        for path in paths {
            let scenario = Scenario::load(&path, &harness, &vars)?;
            // Status and reports are keyed by name.
            if let Some(first) = seen.insert(scenario.name().to_string(), path.clone()) {
                return Err(SuiteError::DuplicateName {
                    name: scenario.name().to_string(),
                    first,
                    second: path,
                });
            }
            if !cli.selects(scenario.name()) {
                continue;
            }
            if cli.only_failures && !status.is_failed(scenario.name()) {
                continue;
            }
            scenarios.push(Arc::new(scenario));
        }

        Ok(Self {
            harness: Arc::new(harness),
            scenarios,
            status,
        })
    }

    pub fn harness(&self) -> &HarnessConfig {
        &self.harness
    }

    pub fn scenarios(&self) -> &[Arc<Scenario>] {
        &self.scenarios
    }

    /// Run every selected scenario, at most `jobs` at a time.
    ///
    /// Reports come back in selection order. Raising `cancel` stops each
    /// scenario before its next step; a scenario that panics is reported
    /// as failed.
    pub async fn run<P>(
        &self,
        platform: Arc<P>,
        jobs: usize,
        log: CaptureLog,
        cancel: Arc<AtomicBool>,
    ) -> Result<Vec<ScenarioReport>, SuiteError>
    where
        P: Platform + 'static,
    {
        let runner = Arc::new(
            ScenarioRunner::new(platform, self.harness.app_settings(), log)
                .with_cancel_flag(cancel),
        );
        let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
        let mut tasks = JoinSet::new();

        for (index, scenario) in self.scenarios.iter().cloned().enumerate() {
            let runner = Arc::clone(&runner);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                let name = scenario.name().to_string();
                let report = match tokio::task::spawn_blocking(move || runner.run(&scenario)).await {
                    Ok(report) => report,
                    Err(err) => crashed(name, err),
                };
                (index, report)
            });
        }

        let mut reports: Vec<Option<ScenarioReport>> =
            std::iter::repeat_with(|| None).take(self.scenarios.len()).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, report) = joined?;
            reports[index] = Some(report);
        }
        Ok(reports.into_iter().flatten().collect())
    }

    /// Record outcomes and write the status file.
    pub fn save_status(&mut self, reports: &[ScenarioReport]) -> Result<(), StatusError> {
        for report in reports {
            let status = match report.outcome {
                Outcome::Passed => Status::Passed,
                Outcome::Failed(_) => Status::Failed,
                Outcome::Skipped { .. } => Status::Skipped,
            };
            let source = self
                .scenarios
                .iter()
                .find(|s| s.name() == report.name)
                .and_then(|s| s.source());
            self.status.record(&report.name, status, source);
        }
        self.status.save()
    }
}

/// Report for a scenario whose blocking task panicked or was aborted.
fn crashed(name: String, err: tokio::task::JoinError) -> ScenarioReport {
    let message = if err.is_panic() {
        let payload = err.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string())
    } else {
        err.to_string()
    };
    tracing::error!(scenario = %name, %message, "scenario task panicked");
    ScenarioReport {
        name,
        outcome: Outcome::Failed(ScenarioFailure::Crashed { message }),
        app: None,
        elapsed: Duration::ZERO,
        teardown_error: None,
    }
}

/// Expand CLI arguments into scenario files; directories are searched recursively.
///
/// Paths are returned once each, in first-seen order.
pub fn scenario_paths(args: &[PathBuf], default_dir: &Path) -> Result<Vec<PathBuf>, ScenarioError> {
    if args.is_empty() {
        return discover(default_dir);
    }
    let mut paths: Vec<PathBuf> = Vec::new();
    for arg in args {
        let found = if arg.is_dir() {
            discover(arg)?
        } else {
            vec![arg.clone()]
        };
        // A file named directly and through its directory runs once.
        for path in found {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

/// Open the capture log, mirrored to a JSONL file when one is given.
pub fn open_capture_log(path: Option<&Path>) -> Result<CaptureLog, SuiteError> {
    match path {
        Some(path) => CaptureLog::with_file(path).map_err(|source| SuiteError::CaptureLog {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(CaptureLog::new()),
    }
}

#[cfg(test)]
#[path = "suite_tests.rs"]
mod tests;
