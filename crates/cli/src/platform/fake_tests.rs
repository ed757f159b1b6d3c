// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::normalize::normalize;
use tempfile::TempDir;

fn app_in(dir: &TempDir) -> AppHandle {
    AppHandle {
        name: "deploycheck-fake1".to_string(),
        work_dir: dir.path().to_path_buf(),
        stack: "heroku-24".to_string(),
    }
}

fn working_copy(requirements: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("requirements.txt"), requirements).unwrap();
    dir
}

#[test]
fn first_build_installs_without_cache() {
    let dir = working_copy("six==1.17.0\n");
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    let outcome = platform.push(&app).unwrap();
    let output = normalize(&outcome.output);

    assert!(outcome.success());
    assert!(output.contains("remote: -----> Building on the heroku-24 stack\n"));
    assert!(output.contains("remote:        Collecting six==1.17.0\n"));
    assert!(output.contains("remote:        Successfully installed six-1.17.0\n"));
    assert!(!output.contains("cache"));
}

#[test]
fn unchanged_repush_restores_cache() {
    let dir = working_copy("six==1.17.0\n");
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    platform.push(&app).unwrap();
    platform.commit(&app, "Empty").unwrap();
    let output = normalize(&platform.push(&app).unwrap().output);

    assert!(output.contains("remote: -----> Restoring cache\n"));
    assert!(output.contains("Requirement already satisfied: six==1.17.0"));
    assert!(output.contains("Released v2"));
}

#[test]
fn changed_tracked_file_discards_cache_naming_it() {
    let dir = working_copy("six==1.17.0\n");
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    platform.push(&app).unwrap();
    std::fs::write(dir.path().join("requirements.txt"), "six==1.17.0\ntyping-extensions==4.14.0\n").unwrap();
    platform.commit(&app, "Update requirements").unwrap();
    let output = normalize(&platform.push(&app).unwrap().output);

    assert!(output.contains(
        "remote: -----> Discarding cache since:\nremote:        - The contents of requirements.txt changed\n"
    ));
    assert!(output.contains("Collecting typing-extensions==4.14.0"));
}

#[test]
fn uncommitted_changes_are_not_built() {
    let dir = working_copy("six==1.17.0\n");
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    platform.push(&app).unwrap();
    std::fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
    let output = platform.push(&app).unwrap().output;

    assert!(output.contains("Restoring cache"));
}

#[test]
fn additional_tracked_files_feed_the_key() {
    let dir = working_copy("six==1.17.0\n");
    std::fs::write(dir.path().join(".python-version"), "3.13\n").unwrap();
    let platform = FakePlatform::new().with_tracked_file(".python-version");
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    platform.push(&app).unwrap();
    std::fs::write(dir.path().join(".python-version"), "3.12\n").unwrap();
    platform.commit(&app, "Downgrade").unwrap();
    let output = platform.push(&app).unwrap().output;

    assert!(output.contains("- The contents of .python-version changed"));
    assert!(!output.contains("- The contents of requirements.txt changed"));
}

#[test]
fn fail_marker_rejects_the_push() {
    let dir = working_copy("six==1.17.0\n");
    std::fs::write(dir.path().join(FAIL_MARKER), "").unwrap();
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    let outcome = platform.push(&app).unwrap();

    assert_eq!(outcome.exit_code, 1);
    assert!(outcome.output.contains("\x1b[1;31m"));
    assert!(normalize(&outcome.output)
        .contains("remote:  !     Push rejected, failed to compile Python app.\n"));
}

#[test]
fn output_carries_transport_noise() {
    let dir = working_copy("six==1.17.0\n");
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    let raw = platform.push(&app).unwrap().output;

    assert!(raw.contains("\x1b[1;36m"));
    assert!(raw.contains("six==1.17.0        \n"));
    assert_eq!(normalize(&raw), normalize(&normalize(&raw)));
}

#[test]
fn buildpacks_are_listed_in_order() {
    let dir = working_copy("");
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    platform
        .set_buildpacks(
            &app,
            &["heroku/python".to_string(), "heroku-community/inline".to_string()],
        )
        .unwrap();
    let output = platform.push(&app).unwrap().output;

    assert!(output.contains(
        "remote: -----> Using buildpacks:\nremote:        1. heroku/python\nremote:        2. heroku-community/inline\n"
    ));
}

#[test]
fn run_serves_scripted_released_and_unknown_commands() {
    let dir = working_copy("six==1.17.0\n");
    let platform = FakePlatform::new().with_run_output("pip --version", 0, "pip 25.1.1 from /app/.heroku/python\n");
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    platform.push(&app).unwrap();

    let scripted = platform.run(&app, "pip --version").unwrap();
    assert_eq!(scripted.output, "pip 25.1.1 from /app/.heroku/python\n");

    let cat = platform.run(&app, "cat requirements.txt").unwrap();
    assert_eq!(cat.output, "six==1.17.0\n");

    let missing = platform.run(&app, "cat nope.txt").unwrap();
    assert_eq!(missing.exit_code, 1);

    let unknown = platform.run(&app, "gunicorn --version").unwrap();
    assert_eq!(unknown.exit_code, 127);
    assert!(unknown.output.contains("gunicorn: command not found"));
}

#[test]
fn calls_are_journaled_and_teardown_destroys() {
    let dir = working_copy("");
    let platform = FakePlatform::new();
    let app = app_in(&dir);

    platform.provision(&app).unwrap();
    platform.push(&app).unwrap();
    assert_eq!(platform.live_apps(), vec!["deploycheck-fake1".to_string()]);
    platform.teardown(&app).unwrap();

    assert_eq!(
        platform.calls(),
        vec![
            "provision deploycheck-fake1",
            "push deploycheck-fake1",
            "teardown deploycheck-fake1",
        ]
    );
    assert!(platform.live_apps().is_empty());
    assert_eq!(platform.destroyed(), vec!["deploycheck-fake1".to_string()]);
}

#[test]
fn unknown_app_is_an_error() {
    let dir = working_copy("");
    let platform = FakePlatform::new();
    assert!(matches!(
        platform.push(&app_in(&dir)),
        Err(PlatformError::UnknownApp(_))
    ));
}

#[test]
fn injected_failures() {
    let dir = working_copy("");
    let app = app_in(&dir);

    let provision = FakePlatform::new().failing_provision();
    assert!(matches!(
        provision.provision(&app),
        Err(PlatformError::CommandFailed { step: "provision", .. })
    ));

    let teardown = FakePlatform::new().failing_teardown();
    teardown.provision(&app).unwrap();
    assert!(matches!(
        teardown.teardown(&app),
        Err(PlatformError::CommandFailed { step: "teardown", .. })
    ));
}
