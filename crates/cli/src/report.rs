// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable scenario results.

use std::time::Duration;

use crate::output_diagnostic::Tag;
use crate::runner::{Outcome, ScenarioFailure, ScenarioReport};

/// Lines of build output shown for an unexpected deploy failure
const DEPLOY_TAIL_LINES: usize = 30;

/// Tag and one-line summary for a report.
pub fn headline(report: &ScenarioReport) -> (Tag, String) {
    match &report.outcome {
        Outcome::Passed => (
            Tag::Pass,
            format!("{} ({})", report.name, format_elapsed(report.elapsed)),
        ),
        Outcome::Skipped { reason } => (Tag::Skip, format!("{}: {}", report.name, reason)),
        Outcome::Failed(_) => {
            let app = report
                .app
                .as_deref()
                .map(|name| format!(" [app {}]", name))
                .unwrap_or_default();
            (
                Tag::Fail,
                format!("{} ({}){}", report.name, format_elapsed(report.elapsed), app),
            )
        }
    }
}

/// Failure explanation, indented under the headline.
pub fn details(report: &ScenarioReport) -> Option<String> {
    let Outcome::Failed(failure) = &report.outcome else {
        return None;
    };

    let mut text = match failure {
        ScenarioFailure::Deploy { output, .. } => {
            let lines: Vec<&str> = output.lines().collect();
            let start = lines.len().saturating_sub(DEPLOY_TAIL_LINES);
            let mut text = format!("{}\nlast {} lines of build output:\n", failure, lines.len() - start);
            for line in &lines[start..] {
                text.push_str(line);
                text.push('\n');
            }
            text
        }
        other => format!("{}\n", other),
    };
    if let Some(err) = &report.teardown_error {
        text.push_str(&format!("teardown also failed: {}\n", err));
    }
    Some(indent(&text, "  "))
}

/// Totals line, e.g. `4 scenarios: 2 passed, 1 failed, 1 skipped`.
pub fn summary(reports: &[ScenarioReport]) -> String {
    let (mut passed, mut failed, mut skipped) = (0, 0, 0);
    for report in reports {
        match report.outcome {
            Outcome::Passed => passed += 1,
            Outcome::Failed(_) => failed += 1,
            Outcome::Skipped { .. } => skipped += 1,
        }
    }
    let noun = if reports.len() == 1 { "scenario" } else { "scenarios" };
    format!(
        "{} {}: {} passed, {} failed, {} skipped",
        reports.len(),
        noun,
        passed,
        failed,
        skipped
    )
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("{}{}\n", prefix, line)
            }
        })
        .collect()
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{}m{:02}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
