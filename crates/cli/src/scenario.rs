// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario loading and compilation.
//!
//! A scenario file is parsed into [`ScenarioConfig`], validated, and compiled
//! into a [`Scenario`]: template placeholders are expanded and every
//! expectation is compiled once, so a broken scenario fails at load time
//! rather than after a slow deploy.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::config::{ExpectSpec, ScenarioConfig, StepSpec, DEFAULT_COMMIT_MESSAGE};
use crate::fixture::{BuildpackRef, FixtureSpec, WriteMode};
use crate::harness::HarnessConfig;
use crate::template::{render_literal, render_segments, TemplateError, TemplateVars};
use crate::transcript::{ExpectedTranscript, TranscriptError};

/// Errors that can occur when loading scenarios
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid scenario '{name}': {message}")]
    Validation { name: String, message: String },

    #[error("scenario '{name}', {location}: {source}")]
    Template {
        name: String,
        location: String,
        #[source]
        source: TemplateError,
    },

    #[error("scenario '{name}': {source}")]
    Transcript {
        name: String,
        #[source]
        source: TranscriptError,
    },

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A compiled lifecycle action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Deploy,
    WriteFile {
        path: PathBuf,
        content: String,
        mode: WriteMode,
    },
    Commit {
        message: String,
    },
    Push,
    Run {
        command: String,
    },
    SetBuildpacks(Vec<BuildpackRef>),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::WriteFile { .. } => "write_file",
            Self::Commit { .. } => "commit",
            Self::Push => "push",
            Self::Run { .. } => "run",
            Self::SetBuildpacks(_) => "set_buildpacks",
        }
    }

    /// Deploy, push and run produce output to check.
    pub fn captures_output(&self) -> bool {
        matches!(self, Self::Deploy | Self::Push | Self::Run { .. })
    }
}

/// One step: an action and what its output must show
#[derive(Debug)]
pub struct Step {
    pub action: Action,
    pub expectations: Vec<ExpectedTranscript>,
}

/// Compiled scenario ready to run
#[derive(Debug)]
pub struct Scenario {
    name: String,
    fixture: FixtureSpec,
    stacks: Vec<String>,
    steps: Vec<Step>,
    source: Option<PathBuf>,
}

impl Scenario {
    /// Load and compile a scenario file.
    pub fn load(
        path: &Path,
        harness: &HarnessConfig,
        vars: &TemplateVars,
    ) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScenarioConfig =
            toml::from_str(&content).map_err(|source| ScenarioError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let mut scenario = Self::from_config(config, harness, vars)?;
        scenario.source = Some(path.to_path_buf());
        Ok(scenario)
    }

    /// Validate and compile a parsed scenario.
    pub fn from_config(
        config: ScenarioConfig,
        harness: &HarnessConfig,
        vars: &TemplateVars,
    ) -> Result<Self, ScenarioError> {
        validate(&config)?;

        let name = config.name;
        let mut steps = Vec::with_capacity(config.steps.len());
        for (index, spec) in config.steps.into_iter().enumerate() {
            steps.push(compile_step(&name, index + 1, spec, vars)?);
        }

        Ok(Self {
            fixture: FixtureSpec {
                source: harness.fixture_path(&config.fixture),
                buildpacks: config.buildpacks,
                allow_failure: config.allow_failure,
            },
            stacks: config.stacks,
            steps,
            source: None,
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fixture(&self) -> &FixtureSpec {
        &self.fixture
    }

    pub fn stacks(&self) -> &[String] {
        &self.stacks
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// File the scenario was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// An empty stack list means every stack.
    pub fn applies_to(&self, stack: &str) -> bool {
        self.stacks.is_empty() || self.stacks.iter().any(|s| s == stack)
    }
}

/// Find every `*.toml` scenario under `dir`, sorted by path.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, ScenarioError> {
    let pattern = format!(
        "{}/**/*.toml",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(Result::ok).collect();
    paths.sort();
    Ok(paths)
}

fn validate(config: &ScenarioConfig) -> Result<(), ScenarioError> {
    let fail = |message: String| ScenarioError::Validation {
        name: config.name.clone(),
        message,
    };

    if config.name.trim().is_empty() {
        return Err(fail("name must not be empty".to_string()));
    }
    if !is_contained(Path::new(&config.fixture)) {
        return Err(fail(format!(
            "fixture '{}' must be a relative path inside the fixtures dir",
            config.fixture
        )));
    }
    if config.buildpacks.is_empty() {
        return Err(fail("buildpacks must not be empty".to_string()));
    }
    if config.steps.is_empty() {
        return Err(fail("at least one step is required".to_string()));
    }

    let deploys = config
        .steps
        .iter()
        .filter(|s| matches!(s, StepSpec::Deploy { .. }))
        .count();
    if deploys != 1 {
        return Err(fail(format!(
            "exactly one deploy step is required, found {}",
            deploys
        )));
    }

    let mut deployed = false;
    for (index, step) in config.steps.iter().enumerate() {
        let position = index + 1;
        match step {
            StepSpec::Deploy { .. } => deployed = true,
            StepSpec::WriteFile { path, .. } => {
                if !is_contained(path) {
                    return Err(fail(format!(
                        "step {} (write_file): path '{}' must be relative and stay inside the app",
                        position,
                        path.display()
                    )));
                }
            }
            other if !deployed => {
                return Err(fail(format!(
                    "step {} ({}) must come after deploy",
                    position,
                    other.action()
                )));
            }
            StepSpec::Run { command, .. } if command.trim().is_empty() => {
                return Err(fail(format!("step {} (run): command is empty", position)));
            }
            StepSpec::SetBuildpacks { buildpacks } if buildpacks.is_empty() => {
                return Err(fail(format!(
                    "step {} (set_buildpacks): buildpacks must not be empty",
                    position
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn is_contained(path: &Path) -> bool {
    let mut any = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => any = true,
            Component::CurDir => {}
            _ => return false,
        }
    }
    any
}

fn compile_step(
    name: &str,
    position: usize,
    spec: StepSpec,
    vars: &TemplateVars,
) -> Result<Step, ScenarioError> {
    let action_name = spec.action();
    let render = |text: &str, what: &str| {
        render_literal(text, vars).map_err(|source| ScenarioError::Template {
            name: name.to_string(),
            location: format!("step {} ({}) {}", position, action_name, what),
            source,
        })
    };

    let action = match &spec {
        StepSpec::Deploy { .. } => Action::Deploy,
        StepSpec::WriteFile {
            path,
            content,
            mode,
        } => Action::WriteFile {
            path: path.clone(),
            content: render(content, "content")?,
            mode: *mode,
        },
        StepSpec::Commit { message } => Action::Commit {
            message: message
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
        },
        StepSpec::Push { .. } => Action::Push,
        StepSpec::Run { command, .. } => Action::Run {
            command: render(command, "command")?,
        },
        StepSpec::SetBuildpacks { buildpacks } => Action::SetBuildpacks(buildpacks.clone()),
    };

    let mut expectations = Vec::new();
    for (index, expect) in spec.expectations().iter().enumerate() {
        let label = expect.name().map(str::to_string).unwrap_or_else(|| {
            format!(
                "step {} ({}) expectation {}",
                position,
                action_name,
                index + 1
            )
        });
        expectations.push(compile_expectation(name, label, expect, vars)?);
    }

    Ok(Step {
        action,
        expectations,
    })
}

fn compile_expectation(
    name: &str,
    label: String,
    spec: &ExpectSpec,
    vars: &TemplateVars,
) -> Result<ExpectedTranscript, ScenarioError> {
    let template_err = |source| ScenarioError::Template {
        name: name.to_string(),
        location: label.clone(),
        source,
    };

    let compiled = match spec {
        ExpectSpec::Contains { text, .. } => {
            let block = render_literal(text, vars).map_err(template_err)?;
            ExpectedTranscript::contains(label.clone(), block)
        }
        ExpectSpec::Pattern { text, .. } => {
            let segments = render_segments(text, vars).map_err(template_err)?;
            ExpectedTranscript::pattern(label.clone(), segments)
        }
        // Regex source is taken verbatim; `{{` has no special meaning there.
        ExpectSpec::Regex { pattern, .. } => ExpectedTranscript::regex(label.clone(), pattern),
        ExpectSpec::Absent { text, .. } => {
            let block = render_literal(text, vars).map_err(template_err)?;
            ExpectedTranscript::absent(label.clone(), block)
        }
    };

    compiled
        .map(|exp| exp.with_raw(spec.raw()))
        .map_err(|source| ScenarioError::Transcript {
            name: name.to_string(),
            source,
        })
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
