// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Harness-wide settings.
//!
//! Read once at startup from `deploycheck.toml` and shared read-only by every
//! scenario. Precedence: built-in defaults, then the file, then the
//! environment, then command-line flags.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env;
use crate::fixture::AppSettings;
use crate::platform::PlatformCommands;
use crate::template::TemplateVars;
use crate::versions::VersionRegistry;

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "deploycheck.toml";
/// Buildpack substituted for `default`
pub const DEFAULT_BUILDPACK_BASE: &str = "https://github.com/heroku/heroku-buildpack-python.git";
/// Stack apps are created on
pub const DEFAULT_STACK: &str = "heroku-24";
/// Prefix of generated app names
pub const DEFAULT_APP_PREFIX: &str = "deploycheck";

/// Errors loading harness settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Contents of `deploycheck.toml`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub buildpack_base: String,
    pub stack: String,
    pub fixtures_dir: PathBuf,
    /// One `<package>.txt` pin file per package
    pub versions_dir: PathBuf,
    pub scenarios_dir: PathBuf,
    pub app_prefix: String,
    /// Last outcome per scenario, for `--only-failures`
    pub status_file: PathBuf,
    /// Extra template literals, exposed as `{{vars.<name>}}`
    pub vars: BTreeMap<String, String>,
    pub platform: PlatformCommands,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            buildpack_base: DEFAULT_BUILDPACK_BASE.to_string(),
            stack: DEFAULT_STACK.to_string(),
            fixtures_dir: PathBuf::from("fixtures"),
            versions_dir: PathBuf::from("requirements"),
            scenarios_dir: PathBuf::from("scenarios"),
            app_prefix: DEFAULT_APP_PREFIX.to_string(),
            status_file: PathBuf::from(".deploycheck-status.json"),
            vars: BTreeMap::new(),
            platform: PlatformCommands::default(),
        }
    }
}

impl HarnessConfig {
    /// Load from an explicit path, `DEPLOYCHECK_CONFIG`, or `./deploycheck.toml`
    /// if present, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit.map(Path::to_path_buf).or_else(env::config_path);
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a config file. Relative directories resolve against its location.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(base);
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for dir in [
            &mut self.fixtures_dir,
            &mut self.versions_dir,
            &mut self.scenarios_dir,
            &mut self.status_file,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    fn apply_env(&mut self) {
        if let Some(base) = env::buildpack_base() {
            self.buildpack_base = base;
        }
        if let Some(stack) = env::default_stack() {
            self.stack = stack;
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, stack: Option<String>, buildpack_base: Option<String>) -> Self {
        if let Some(stack) = stack {
            self.stack = stack;
        }
        if let Some(base) = buildpack_base {
            self.buildpack_base = base;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stack.trim().is_empty() {
            return Err(ConfigError::Invalid("stack must not be empty".to_string()));
        }
        if self.buildpack_base.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "buildpack_base must not be empty".to_string(),
            ));
        }
        let prefix_ok = self
            .app_prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
            && self
                .app_prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !prefix_ok {
            return Err(ConfigError::Invalid(format!(
                "app_prefix '{}' must start with a lowercase letter and contain only lowercase letters, digits and dashes",
                self.app_prefix
            )));
        }
        Ok(())
    }

    /// Placeholder values for transcripts.
    pub fn template_vars(&self, registry: &VersionRegistry) -> TemplateVars {
        let mut vars = TemplateVars::new().with_versions(registry);
        vars.insert("stack", self.stack.as_str());
        vars.insert("buildpack_base", self.buildpack_base.as_str());
        for (name, value) in &self.vars {
            vars.insert(format!("vars.{}", name), value.as_str());
        }
        vars
    }

    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            app_prefix: self.app_prefix.clone(),
            stack: self.stack.clone(),
            buildpack_base: self.buildpack_base.clone(),
        }
    }

    pub fn fixture_path(&self, fixture: &str) -> PathBuf {
        self.fixtures_dir.join(fixture)
    }
}

#[cfg(test)]
#[path = "harness_tests.rs"]
mod tests;
