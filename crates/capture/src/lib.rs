// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Captured output records for deploy scenarios.
//!
//! Every lifecycle action that produces text (a deploy, a push, a one-off
//! run) yields one immutable [`CapturedOutput`]. The [`CaptureLog`] keeps an
//! ordered record of those captures across scenarios, optionally mirrored to
//! a JSONL file for post-mortem inspection.

mod duration_serde;
mod log;
mod output;

pub use log::{CaptureLog, CaptureRecord};
pub use output::{CapturedOutput, StreamOrigin};
