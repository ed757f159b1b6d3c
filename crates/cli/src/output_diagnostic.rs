// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic output helpers for consistent error/warning formatting.
//!
//! Provides ANSI color support with automatic terminal detection.

use std::io::{self, IsTerminal, Write};

/// Print an error message to stderr.
///
/// Displays in red when stderr is a terminal, plain text otherwise.
pub fn print_error(msg: impl std::fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_error(&mut io::stderr(), msg, is_tty);
}

/// Write an error message to a writer with explicit terminal flag.
fn write_error<W: Write>(writer: &mut W, msg: impl std::fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[31mError: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Error: {}", msg);
    }
}

/// Print a warning message to stderr.
///
/// Displays in yellow when stderr is a terminal, plain text otherwise.
pub fn print_warning(msg: impl std::fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_warning(&mut io::stderr(), msg, is_tty);
}

/// Write a warning message to a writer with explicit terminal flag.
fn write_warning<W: Write>(writer: &mut W, msg: impl std::fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[33mWarning: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Warning: {}", msg);
    }
}

/// Result tag printed before a scenario headline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Pass,
    Fail,
    Skip,
}

impl Tag {
    fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Pass => "\x1b[32m",
            Self::Fail => "\x1b[31m",
            Self::Skip => "\x1b[33m",
        }
    }
}

/// Print a tagged scenario result to stdout, followed by any detail text.
///
/// Only the tag is coloured, and only when stdout is a terminal.
pub fn print_result(tag: Tag, headline: impl std::fmt::Display, details: Option<&str>) {
    let is_tty = io::stdout().is_terminal();
    write_result(&mut io::stdout().lock(), tag, headline, details, is_tty);
}

fn write_result<W: Write>(
    writer: &mut W,
    tag: Tag,
    headline: impl std::fmt::Display,
    details: Option<&str>,
    is_terminal: bool,
) {
    if is_terminal {
        let _ = writeln!(writer, "{}{}\x1b[0m {}", tag.color(), tag.label(), headline);
    } else {
        let _ = writeln!(writer, "{} {}", tag.label(), headline);
    }
    if let Some(details) = details {
        let _ = write!(writer, "{}", details);
        if !details.ends_with('\n') {
            let _ = writeln!(writer);
        }
    }
}

#[cfg(test)]
#[path = "output_diagnostic_tests.rs"]
mod tests;
