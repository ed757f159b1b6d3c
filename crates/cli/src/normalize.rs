// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output normalization.
//!
//! Platform output carries two kinds of noise that make transcripts
//! unstable: the git transport pads some lines with eight trailing spaces,
//! and buildpacks colour their error messages with ANSI escape codes.
//! [`normalize`] removes exactly those and nothing else.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// ANSI CSI colour/style sequences with at least one parameter (`ESC [ 1;31 m`)
static ANSI_SGR_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]+m").ok());

/// Eight-space pads (possibly repeated) directly before a line break
static TRAILING_PAD_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?: {8})+(\r\n|\n|\r)").ok());

/// Strip ANSI SGR sequences and transport trailing pads.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(input: &str) -> String {
    let stripped = strip_ansi(input);
    strip_trailing_pads(&stripped).into_owned()
}

/// Remove ANSI SGR sequences until none remain.
///
/// A single pass can expose a new sequence (`ESC[ESC[0m1m`), so this runs
/// to a fixed point.
pub fn strip_ansi(input: &str) -> String {
    let Some(re) = ANSI_SGR_REGEX.as_ref() else {
        return input.to_string();
    };
    let mut current = input.to_string();
    while re.is_match(&current) {
        current = re.replace_all(&current, "").into_owned();
    }
    current
}

/// Remove runs of eight trailing spaces before each line break.
pub fn strip_trailing_pads(input: &str) -> Cow<'_, str> {
    match TRAILING_PAD_REGEX.as_ref() {
        Some(re) => re.replace_all(input, "$1"),
        None => Cow::Borrowed(input),
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
