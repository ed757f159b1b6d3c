// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Deploy fixture apps and check their build output against expected transcripts
#[derive(Parser, Debug, Clone)]
#[command(name = "deploycheck", version, about)]
pub struct Cli {
    /// Scenario files or directories (default: the configured scenarios dir)
    #[arg(value_name = "SCENARIO")]
    pub scenarios: Vec<PathBuf>,

    /// Harness config file (default: $DEPLOYCHECK_CONFIG or ./deploycheck.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stack to create apps on; overrides config and environment
    #[arg(long)]
    pub stack: Option<String>,

    /// Buildpack used for the `default` entry; overrides config and environment
    #[arg(long, value_name = "URL")]
    pub buildpack_base: Option<String>,

    /// Only run scenarios whose name contains TEXT (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Only run scenarios that failed last time
    #[arg(long)]
    pub only_failures: bool,

    /// Scenarios to run at once
    #[arg(long, short = 'j', default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Append every captured output to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub capture_log: Option<PathBuf>,

    /// List selected scenarios without running them
    #[arg(long)]
    pub list: bool,

    /// Log verbosity (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive for `tracing_subscriber::EnvFilter`
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Whether `--filter` admits a scenario name.
    pub fn selects(&self, name: &str) -> bool {
        match &self.filter {
            Some(text) => name.to_lowercase().contains(&text.to_lowercase()),
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
