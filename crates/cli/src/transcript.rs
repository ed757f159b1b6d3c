// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Expected transcripts and matching against captured output.
//!
//! Four kinds of expectation are supported:
//!
//! - **contains**: a literal block that must appear contiguously. Blocks that
//!   span several lines must start at the beginning of a line.
//! - **pattern**: literal text interleaved with bounded wildcards, compiled
//!   once into a regex. Wildcards never cross a line break.
//! - **regex**: a raw regular expression, for cases the pattern grammar
//!   cannot express.
//! - **absent**: text that must not appear.
//!
//! A failed check produces a [`Mismatch`] whose `Display` is the report
//! shown to the user: which expectation failed plus a diff against the
//! closest window of actual output.

use regex::{Regex, RegexBuilder};
use similar::TextDiff;
use thiserror::Error;

/// Lines of trailing output shown when no better anchor exists.
const TAIL_LINES: usize = 20;

/// Errors compiling an expectation
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("expectation `{0}` has empty text")]
    EmptyExpectation(String),

    #[error("invalid regex in expectation `{label}`: {source}")]
    Regex {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// Bounded wildcard kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wildcard {
    /// Any text within one line, possibly empty (`{{*}}`)
    Any,
    /// At least one character within one line (`{{+}}`)
    NonEmpty,
}

impl Wildcard {
    /// Template marker inside `{{ }}`
    pub fn marker(self) -> &'static str {
        match self {
            Wildcard::Any => "*",
            Wildcard::NonEmpty => "+",
        }
    }

    fn regex(self) -> &'static str {
        match self {
            Wildcard::Any => "[^\n]*",
            Wildcard::NonEmpty => "[^\n]+",
        }
    }
}

/// One piece of a pattern block
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Wildcard(Wildcard),
}

/// A compiled pattern expectation
#[derive(Clone, Debug)]
pub struct PatternBlock {
    segments: Vec<Segment>,
    regex: Regex,
    lines: Vec<LinePattern>,
}

#[derive(Clone, Debug)]
struct LinePattern {
    display: String,
    regex: Regex,
}

impl PatternBlock {
    /// Compile segments into a matcher.
    pub fn compile(segments: Vec<Segment>) -> Result<Self, regex::Error> {
        let regex = Regex::new(&segments_regex(&segments))?;

        let mut lines = Vec::new();
        for line in split_lines(&segments) {
            let display = line.iter().map(segment_display).collect::<String>();
            let regex = Regex::new(&format!("^{}$", segments_regex(&line)))?;
            lines.push(LinePattern { display, regex });
        }

        Ok(Self {
            segments,
            regex,
            lines,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True if the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Human-readable form with `{{*}}` / `{{+}}` markers
    pub fn display(&self) -> String {
        self.segments.iter().map(segment_display).collect()
    }
}

fn segment_display(segment: &Segment) -> String {
    match segment {
        Segment::Literal(text) => text.clone(),
        Segment::Wildcard(w) => format!("{{{{{}}}}}", w.marker()),
    }
}

fn segments_regex(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            Segment::Literal(text) => regex::escape(text),
            Segment::Wildcard(w) => w.regex().to_string(),
        })
        .collect()
}

/// Split segments at literal line breaks. A trailing line break does not
/// open an extra empty line.
fn split_lines(segments: &[Segment]) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = vec![Vec::new()];
    for segment in segments {
        match segment {
            Segment::Wildcard(_) => {
                if let Some(current) = lines.last_mut() {
                    current.push(segment.clone());
                }
            }
            Segment::Literal(text) => {
                for (i, part) in text.split('\n').enumerate() {
                    if i > 0 {
                        lines.push(Vec::new());
                    }
                    if !part.is_empty() {
                        if let Some(current) = lines.last_mut() {
                            current.push(Segment::Literal(part.to_string()));
                        }
                    }
                }
            }
        }
    }
    if lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

/// How an expectation compares against output
#[derive(Clone, Debug)]
pub enum Matcher {
    Contains(String),
    Pattern(PatternBlock),
    Regex(Regex),
    Absent(String),
}

/// A labelled expectation, checked against normalized (or raw) output
#[derive(Clone, Debug)]
pub struct ExpectedTranscript {
    label: String,
    matcher: Matcher,
    raw: bool,
}

impl ExpectedTranscript {
    /// Literal block that must appear
    pub fn contains(label: impl Into<String>, block: impl Into<String>) -> Result<Self, TranscriptError> {
        let label = label.into();
        let block = block.into();
        if block.is_empty() {
            return Err(TranscriptError::EmptyExpectation(label));
        }
        Ok(Self::new(label, Matcher::Contains(block)))
    }

    /// Literal/wildcard pattern that must match somewhere
    pub fn pattern(label: impl Into<String>, segments: Vec<Segment>) -> Result<Self, TranscriptError> {
        let label = label.into();
        let has_text = segments
            .iter()
            .any(|s| matches!(s, Segment::Literal(t) if !t.is_empty()));
        if !has_text {
            return Err(TranscriptError::EmptyExpectation(label));
        }
        let block = PatternBlock::compile(segments).map_err(|source| TranscriptError::Regex {
            label: label.clone(),
            source,
        })?;
        Ok(Self::new(label, Matcher::Pattern(block)))
    }

    /// Raw regular expression; `^`/`$` match at line boundaries
    pub fn regex(label: impl Into<String>, pattern: &str) -> Result<Self, TranscriptError> {
        let label = label.into();
        if pattern.is_empty() {
            return Err(TranscriptError::EmptyExpectation(label));
        }
        let regex = RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .map_err(|source| TranscriptError::Regex {
                label: label.clone(),
                source,
            })?;
        Ok(Self::new(label, Matcher::Regex(regex)))
    }

    /// Text that must not appear
    pub fn absent(label: impl Into<String>, text: impl Into<String>) -> Result<Self, TranscriptError> {
        let label = label.into();
        let text = text.into();
        if text.is_empty() {
            return Err(TranscriptError::EmptyExpectation(label));
        }
        Ok(Self::new(label, Matcher::Absent(text)))
    }

    fn new(label: String, matcher: Matcher) -> Self {
        Self {
            label,
            matcher,
            raw: false,
        }
    }

    /// Check against un-normalized output instead
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Whether the check runs on raw rather than normalized output
    pub fn uses_raw_output(&self) -> bool {
        self.raw
    }

    /// Compare against output, returning a report on failure.
    pub fn check(&self, output: &str) -> Result<(), Box<Mismatch>> {
        let passed = match &self.matcher {
            Matcher::Contains(block) => contains_block(output, block),
            Matcher::Pattern(block) => block.is_match(output),
            Matcher::Regex(regex) => regex.is_match(output),
            Matcher::Absent(text) => !output.contains(text.as_str()),
        };
        if passed {
            Ok(())
        } else {
            Err(Box::new(self.mismatch(output)))
        }
    }

    fn mismatch(&self, output: &str) -> Mismatch {
        let actual: Vec<&str> = output.lines().collect();
        match &self.matcher {
            Matcher::Contains(block) => {
                let expected: Vec<&str> = block.lines().collect();
                let (start, window) = nearest_window(&actual, expected.len(), |k, line| {
                    expected[k] == line
                });
                let diff = render_diff(&expected, &window, |line| {
                    expected.iter().find(|e| **e == line).map(|e| e.to_string())
                });
                Mismatch::missing(&self.label, block.clone(), start, window, diff)
            }
            Matcher::Pattern(block) => {
                let expected: Vec<&str> = block.lines.iter().map(|l| l.display.as_str()).collect();
                let (start, window) = nearest_window(&actual, block.lines.len(), |k, line| {
                    block.lines[k].regex.is_match(line)
                });
                let diff = render_diff(&expected, &window, |line| {
                    block
                        .lines
                        .iter()
                        .find(|l| l.regex.is_match(line))
                        .map(|l| l.display.clone())
                });
                Mismatch::missing(&self.label, block.display(), start, window, diff)
            }
            Matcher::Regex(regex) => {
                let start = actual.len().saturating_sub(TAIL_LINES);
                let window: Vec<String> = actual[start..].iter().map(|l| l.to_string()).collect();
                Mismatch::missing(&self.label, regex.as_str().to_string(), start, window, String::new())
            }
            Matcher::Absent(text) => {
                let needle = text.lines().next().unwrap_or(text.as_str());
                let mut start = None;
                let mut window = Vec::new();
                for (i, line) in actual.iter().enumerate() {
                    if line.contains(needle) {
                        start.get_or_insert(i);
                        window.push(line.to_string());
                    }
                }
                Mismatch {
                    label: self.label.clone(),
                    kind: MismatchKind::Present,
                    expected: text.clone(),
                    nearest_start: start.unwrap_or(0) + 1,
                    nearest: window,
                    diff: String::new(),
                }
            }
        }
    }
}

/// True if `block` occurs in `haystack`; multi-line blocks must start a line.
pub fn contains_block(haystack: &str, block: &str) -> bool {
    let multi_line = block.trim_end_matches('\n').contains('\n');
    if !multi_line {
        return haystack.contains(block);
    }

    let mut from = 0;
    while let Some(pos) = haystack[from..].find(block) {
        let at = from + pos;
        if at == 0 || haystack.as_bytes()[at - 1] == b'\n' {
            return true;
        }
        // Step past the first character of this occurrence
        let step = haystack[at..].chars().next().map_or(1, char::len_utf8);
        from = at + step;
    }
    false
}

/// Find the window of `len` actual lines that agrees with the most expected
/// lines. Returns the zero-based start and the window.
fn nearest_window<F>(actual: &[&str], len: usize, matches: F) -> (usize, Vec<String>)
where
    F: Fn(usize, &str) -> bool,
{
    let len = len.max(1);
    if actual.len() <= len {
        return (0, actual.iter().map(|l| l.to_string()).collect());
    }

    let mut best = (0, 0);
    for start in 0..=actual.len() - len {
        let score = (0..len)
            .filter(|&k| matches(k, actual[start + k]))
            .count();
        if score > best.1 {
            best = (start, score);
        }
    }

    let (start, _) = best;
    let window = actual[start..start + len]
        .iter()
        .map(|l| l.to_string())
        .collect();
    (start, window)
}

/// Unified diff of expected lines against actual lines. Actual lines that
/// satisfy some expected line are shown in their expected form so that
/// wildcard matches do not appear as changes.
fn render_diff<F>(expected: &[&str], actual: &[String], canonical: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let expected_text = join_lines(expected.iter().copied());
    let shown: Vec<String> = actual
        .iter()
        .map(|line| canonical(line).unwrap_or_else(|| line.clone()))
        .collect();
    let actual_text = join_lines(shown.iter().map(String::as_str));

    TextDiff::from_lines(expected_text.as_str(), actual_text.as_str())
        .unified_diff()
        .context_radius(3)
        .header("expected", "actual")
        .to_string()
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Why an expectation failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MismatchKind {
    /// Expected text did not appear
    Missing,
    /// Forbidden text appeared
    Present,
}

/// A failed expectation with enough context to debug it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub label: String,
    pub kind: MismatchKind,
    /// Expected block as written (wildcards shown as markers)
    pub expected: String,
    /// One-based line number of the first nearest line
    pub nearest_start: usize,
    pub nearest: Vec<String>,
    /// Unified diff, empty when not applicable
    pub diff: String,
}

impl Mismatch {
    fn missing(label: &str, expected: String, start: usize, nearest: Vec<String>, diff: String) -> Self {
        Self {
            label: label.to_string(),
            kind: MismatchKind::Missing,
            expected,
            nearest_start: start + 1,
            nearest,
            diff,
        }
    }
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MismatchKind::Missing => {
                writeln!(f, "expected transcript `{}` not found in output", self.label)?;
                writeln!(f, "expected:")?;
                for line in self.expected.lines() {
                    writeln!(f, "    {}", line)?;
                }
                if self.nearest.is_empty() {
                    return writeln!(f, "output was empty");
                }
                writeln!(f, "nearest output (from line {}):", self.nearest_start)?;
                if self.diff.is_empty() {
                    for line in &self.nearest {
                        writeln!(f, "    {}", line)?;
                    }
                    Ok(())
                } else {
                    write!(f, "{}", self.diff)
                }
            }
            MismatchKind::Present => {
                writeln!(
                    f,
                    "unexpected text `{}` found in output (line {}):",
                    self.label, self.nearest_start
                )?;
                for line in &self.nearest {
                    writeln!(f, "    {}", line)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "transcript_tests.rs"]
mod tests;
