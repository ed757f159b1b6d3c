// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drives one scenario through its steps.
//!
//! Steps run strictly in order. Every capture goes to the capture log, is
//! normalized, and is checked against the step's expectations in order. The
//! first failure stops the scenario; the app is torn down on every path.
//! A raised cancellation flag stops the scenario before its next step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use deploycheck_capture::{CaptureLog, CapturedOutput};
use thiserror::Error;

use crate::fixture::{AppSettings, FixtureApp, FixtureError};
use crate::normalize::normalize;
use crate::platform::Platform;
use crate::scenario::{Action, Scenario, Step};
use crate::transcript::Mismatch;

/// Why a scenario failed
#[derive(Debug, Error)]
pub enum ScenarioFailure {
    #[error("step {step} ({action}): deploy failed with exit code {exit_code}")]
    Deploy {
        step: usize,
        action: &'static str,
        exit_code: i32,
        /// Normalized build output
        output: String,
    },

    #[error("step {step} ({action}): {mismatch}")]
    Assertion {
        step: usize,
        action: &'static str,
        mismatch: Box<Mismatch>,
    },

    #[error("step {step} ({action}): {source}")]
    Fixture {
        step: usize,
        action: &'static str,
        #[source]
        source: FixtureError,
    },

    #[error("could not prepare fixture: {0}")]
    Setup(#[source] FixtureError),

    #[error("{0}")]
    Teardown(#[source] FixtureError),

    #[error("cancelled before step {step} ({action})")]
    Cancelled { step: usize, action: &'static str },

    #[error("scenario task panicked: {message}")]
    Crashed { message: String },
}

/// Result of one scenario
#[derive(Debug)]
pub enum Outcome {
    Passed,
    Skipped { reason: String },
    Failed(ScenarioFailure),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What happened when a scenario ran
#[derive(Debug)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: Outcome,
    /// Platform app name, when one was created
    pub app: Option<String>,
    pub elapsed: Duration,
    /// Teardown error swallowed because an earlier failure is reported
    pub teardown_error: Option<String>,
}

/// Runs scenarios against one platform
pub struct ScenarioRunner<P: Platform + ?Sized> {
    platform: Arc<P>,
    settings: AppSettings,
    log: CaptureLog,
    cancel: Arc<AtomicBool>,
}

impl<P: Platform + ?Sized> ScenarioRunner<P> {
    pub fn new(platform: Arc<P>, settings: AppSettings, log: CaptureLog) -> Self {
        Self {
            platform,
            settings,
            log,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation flag, e.g. one raised by SIGINT.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn capture_log(&self) -> &CaptureLog {
        &self.log
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let started = Instant::now();
        let mut report = ScenarioReport {
            name: scenario.name().to_string(),
            outcome: Outcome::Passed,
            app: None,
            elapsed: Duration::ZERO,
            teardown_error: None,
        };

        if !scenario.applies_to(&self.settings.stack) {
            let reason = format!(
                "stack {} not in [{}]",
                self.settings.stack,
                scenario.stacks().join(", ")
            );
            tracing::info!(scenario = %scenario.name(), %reason, "skipping");
            report.outcome = Outcome::Skipped { reason };
            return report;
        }
        if self.cancelled() {
            report.outcome = Outcome::Skipped {
                reason: "run cancelled".to_string(),
            };
            return report;
        }

        let mut app = match FixtureApp::create(&*self.platform, scenario.fixture(), &self.settings) {
            Ok(app) => app,
            Err(err) => {
                report.outcome = Outcome::Failed(ScenarioFailure::Setup(err));
                report.elapsed = started.elapsed();
                return report;
            }
        };
        report.app = Some(app.name().to_string());
        tracing::info!(scenario = %scenario.name(), app = %app.name(), "starting scenario");

        let failure = self.run_steps(scenario, &mut app).err();
        let teardown = app.teardown();

        report.outcome = match (failure, teardown) {
            (None, Ok(())) => Outcome::Passed,
            (None, Err(err)) => Outcome::Failed(ScenarioFailure::Teardown(err)),
            (Some(failure), Ok(())) => Outcome::Failed(failure),
            (Some(failure), Err(err)) => {
                tracing::warn!(
                    scenario = %scenario.name(),
                    app = %app.name(),
                    error = %err,
                    "teardown failed after an earlier failure"
                );
                report.teardown_error = Some(err.to_string());
                Outcome::Failed(failure)
            }
        };
        report.elapsed = started.elapsed();
        tracing::info!(
            scenario = %scenario.name(),
            failed = report.outcome.is_failure(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "finished scenario"
        );
        report
    }

    fn run_steps(
        &self,
        scenario: &Scenario,
        app: &mut FixtureApp<'_, P>,
    ) -> Result<(), ScenarioFailure> {
        for (index, step) in scenario.steps().iter().enumerate() {
            let position = index + 1;
            let action = step.action.name();
            if self.cancelled() {
                tracing::warn!(scenario = %scenario.name(), step = position, action, "cancelled");
                return Err(ScenarioFailure::Cancelled {
                    step: position,
                    action,
                });
            }
            tracing::info!(scenario = %scenario.name(), step = position, action, "running step");

            let fixture_err = |source| ScenarioFailure::Fixture {
                step: position,
                action,
                source,
            };

            let captured = match &step.action {
                Action::Deploy => Some(app.deploy()),
                Action::Push => Some(app.push()),
                Action::Run { command } => Some(app.run(command)),
                Action::WriteFile {
                    path,
                    content,
                    mode,
                } => {
                    app.write_file(path, content, *mode).map_err(fixture_err)?;
                    None
                }
                Action::Commit { message } => {
                    app.commit(message).map_err(fixture_err)?;
                    None
                }
                Action::SetBuildpacks(buildpacks) => {
                    app.set_buildpacks(buildpacks.clone()).map_err(fixture_err)?;
                    None
                }
            };

            match captured {
                None => {}
                Some(Ok(output)) => self.check(scenario, position, step, &output)?,
                Some(Err(FixtureError::DeployFailure { exit_code, output })) => {
                    self.log.record(scenario.name(), action, &output);
                    return Err(ScenarioFailure::Deploy {
                        step: position,
                        action,
                        exit_code,
                        output: normalize(output.raw()),
                    });
                }
                Some(Err(err)) => return Err(fixture_err(err)),
            }
        }
        Ok(())
    }

    fn check(
        &self,
        scenario: &Scenario,
        position: usize,
        step: &Step,
        output: &CapturedOutput,
    ) -> Result<(), ScenarioFailure> {
        let action = step.action.name();
        self.log.record(scenario.name(), action, output);
        tracing::debug!(
            scenario = %scenario.name(),
            step = position,
            origin = %output.origin(),
            exit_code = output.exit_code(),
            bytes = output.raw().len(),
            "captured output"
        );

        let normalized = normalize(output.raw());
        for expectation in &step.expectations {
            let text = if expectation.uses_raw_output() {
                output.raw()
            } else {
                normalized.as_str()
            };
            expectation
                .check(text)
                .map_err(|mismatch| ScenarioFailure::Assertion {
                    step: position,
                    action,
                    mismatch,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
