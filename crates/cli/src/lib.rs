// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative build-output verification for buildpack deploys
//!
//! A scenario names a fixture app, a sequence of lifecycle steps (deploy,
//! write a file, commit, push, run a one-off command) and the transcripts
//! each step's output must contain. The harness deploys a fresh copy of the
//! fixture to a platform, normalizes every captured output, checks it, and
//! always tears the app down again.
//!
//! The platform sits behind [`platform::Platform`]; [`platform::CommandPlatform`]
//! drives a real CLI through shell templates and [`platform::FakePlatform`]
//! is an in-process double with deterministic build output.

/// Re-exported capture types from the deploycheck-capture crate.
pub mod capture {
    pub use deploycheck_capture::{CaptureLog, CaptureRecord, CapturedOutput, StreamOrigin};
}

pub mod cli;
pub mod config;
pub mod env;
pub mod fixture;
pub mod harness;
pub mod normalize;
#[doc(hidden)]
pub mod output_diagnostic;
pub mod platform;
#[doc(hidden)]
pub mod report;
pub mod runner;
pub mod scenario;
pub mod status;
#[doc(hidden)]
pub mod suite;
pub mod template;
pub mod transcript;
pub mod versions;
