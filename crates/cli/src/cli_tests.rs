// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
use super::*;

#[test]
fn test_parse_defaults() {
    let cli = Cli::try_parse_from(["deploycheck"]).unwrap();
    assert!(cli.scenarios.is_empty());
    assert_eq!(cli.jobs, 1);
    assert_eq!(cli.log_level, LogLevel::Warn);
    assert!(!cli.only_failures);
    assert!(!cli.list);
    assert!(cli.config.is_none());
}

#[test]
fn test_parse_scenarios_and_overrides() {
    let cli = Cli::try_parse_from([
        "deploycheck",
        "--stack",
        "heroku-22",
        "--buildpack-base",
        "heroku/python",
        "-j",
        "4",
        "scenarios/pip",
        "scenarios/cache.toml",
    ])
    .unwrap();
    assert_eq!(cli.stack.as_deref(), Some("heroku-22"));
    assert_eq!(cli.buildpack_base.as_deref(), Some("heroku/python"));
    assert_eq!(cli.jobs, 4);
    assert_eq!(
        cli.scenarios,
        vec![
            PathBuf::from("scenarios/pip"),
            PathBuf::from("scenarios/cache.toml")
        ]
    );
}

#[test]
fn test_parse_rejects_zero_jobs() {
    assert!(Cli::try_parse_from(["deploycheck", "--jobs", "0"]).is_err());
}

#[test]
fn test_parse_log_level() {
    let cli = Cli::try_parse_from(["deploycheck", "--log-level", "debug"]).unwrap();
    assert_eq!(cli.log_level.as_filter(), "debug");
    assert!(Cli::try_parse_from(["deploycheck", "--log-level", "loud"]).is_err());
}

#[test]
fn test_filter_is_case_insensitive_substring() {
    let cli = Cli::try_parse_from(["deploycheck", "--filter", "CACHE"]).unwrap();
    assert!(cli.selects("pip cache reuse"));
    assert!(!cli.selects("poetry basic"));

    let all = Cli::try_parse_from(["deploycheck"]).unwrap();
    assert!(all.selects("anything"));
}
