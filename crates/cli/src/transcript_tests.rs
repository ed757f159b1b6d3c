// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use yare::parameterized;

const OUTPUT: &str = "\
remote: -----> Python app detected
remote: hello
remote: world
remote: -----> Inline app detected
";

fn lit(text: &str) -> Segment {
    Segment::Literal(text.to_string())
}

#[test]
fn ordered_block_matches() {
    let exp = ExpectedTranscript::contains("greeting", "remote: hello\nremote: world\n").unwrap();
    assert!(exp.check(OUTPUT).is_ok());
}

#[test]
fn reordered_block_fails() {
    let exp = ExpectedTranscript::contains("greeting", "remote: world\nremote: hello\n").unwrap();
    let mismatch = exp.check(OUTPUT).unwrap_err();
    assert_eq!(mismatch.kind, MismatchKind::Missing);
    assert_eq!(mismatch.label, "greeting");
}

#[parameterized(
    start_of_text = { "a\nb\n", "a\nb\n", true },
    after_newline = { "x\na\nb\n", "a\nb\n", true },
    mid_line = { "xa\nb\n", "a\nb\n", false },
    later_anchored_occurrence = { "xa\nb\na\nb\n", "a\nb\n", true },
    single_line_mid_line = { "remote:   Building wheel for pysqlite3\n", "Building wheel for pysqlite3", true },
    single_line_with_newline = { "xpip 25.1\n", "pip 25.1\n", true },
    absent_block = { "a\nc\n", "a\nb\n", false },
)]
fn containment(haystack: &str, block: &str, expected: bool) {
    assert_eq!(contains_block(haystack, block), expected);
}

#[test]
fn contains_handles_multibyte_prefix() {
    assert!(contains_block("é\na\nb\n", "a\nb\n"));
    assert!(!contains_block("éa\nb\n", "a\nb\n"));
}

#[test]
fn pattern_wildcard_matches_temp_dir() {
    let exp = ExpectedTranscript::pattern(
        "editable paths",
        vec![
            lit("easy-install.pth:/tmp/build_"),
            Segment::Wildcard(Wildcard::NonEmpty),
            lit("/packages/local_package_setup_py\n"),
        ],
    )
    .unwrap();

    let output = "remote:        easy-install.pth:/tmp/build_f2d8e1/packages/local_package_setup_py\n";
    assert!(exp.check(output).is_ok());
}

#[test]
fn pattern_literals_are_escaped() {
    let exp = ExpectedTranscript::pattern(
        "vcs",
        vec![lit("Running entrypoint for the VCS package: gunicorn (version 20.1.0)")],
    )
    .unwrap();
    assert!(exp
        .check("remote: Running entrypoint for the VCS package: gunicorn (version 20.1.0)\n")
        .is_ok());
    assert!(exp
        .check("remote: Running entrypoint for the VCS package: gunicorn version 20.1.0\n")
        .is_err());
}

#[test]
fn wildcard_does_not_cross_lines() {
    let exp = ExpectedTranscript::pattern(
        "bounded",
        vec![lit("start "), Segment::Wildcard(Wildcard::Any), lit(" end")],
    )
    .unwrap();
    assert!(exp.check("start middle end").is_ok());
    assert!(exp.check("start middle\nmore end").is_err());
}

#[test]
fn non_empty_wildcard_requires_text() {
    let exp = ExpectedTranscript::pattern(
        "non-empty",
        vec![lit("build_"), Segment::Wildcard(Wildcard::NonEmpty), lit("/")],
    )
    .unwrap();
    assert!(exp.check("build_/").is_err());
    assert!(exp.check("build_x/").is_ok());

    let any = ExpectedTranscript::pattern(
        "any",
        vec![lit("build_"), Segment::Wildcard(Wildcard::Any), lit("/")],
    )
    .unwrap();
    assert!(any.check("build_/").is_ok());
}

#[test]
fn pattern_display_shows_markers() {
    let block = PatternBlock::compile(vec![
        lit("/tmp/build_"),
        Segment::Wildcard(Wildcard::NonEmpty),
        lit("/x "),
        Segment::Wildcard(Wildcard::Any),
    ])
    .unwrap();
    assert_eq!(block.display(), "/tmp/build_{{+}}/x {{*}}");
    assert_eq!(block.segments().len(), 4);
}

#[test]
fn regex_expectation_is_multiline() {
    let exp = ExpectedTranscript::regex("anchored", r"^remote: world$").unwrap();
    assert!(exp.check(OUTPUT).is_ok());
}

#[test]
fn invalid_regex_is_reported() {
    let err = ExpectedTranscript::regex("bad", r"gunicorn (version").unwrap_err();
    assert!(matches!(err, TranscriptError::Regex { ref label, .. } if label == "bad"));
}

#[test]
fn empty_expectations_are_rejected() {
    assert!(matches!(
        ExpectedTranscript::contains("c", ""),
        Err(TranscriptError::EmptyExpectation(_))
    ));
    assert!(matches!(
        ExpectedTranscript::absent("a", ""),
        Err(TranscriptError::EmptyExpectation(_))
    ));
    assert!(matches!(
        ExpectedTranscript::pattern("p", vec![Segment::Wildcard(Wildcard::Any)]),
        Err(TranscriptError::EmptyExpectation(_))
    ));
}

#[test]
fn absent_passes_and_fails() {
    let exp = ExpectedTranscript::absent("no rejection", "Push rejected").unwrap();
    assert!(exp.check(OUTPUT).is_ok());

    let failing = "remote: ok\nremote:  !     Push rejected, failed to compile Python app.\n";
    let mismatch = exp.check(failing).unwrap_err();
    assert_eq!(mismatch.kind, MismatchKind::Present);
    assert_eq!(mismatch.nearest_start, 2);
    assert_eq!(
        mismatch.nearest,
        vec!["remote:  !     Push rejected, failed to compile Python app.".to_string()]
    );
    assert!(mismatch.to_string().contains("unexpected text `no rejection`"));
}

#[test]
fn mismatch_points_at_nearest_lines() {
    let output = "\
remote: -----> Python app detected
remote: -----> Using Python 3.13 specified in .python-version
remote: -----> Discarding cache since:
remote:        - The contents of requirements.txt changed
remote: -----> Installing Python 3.13.5
";
    let exp = ExpectedTranscript::contains(
        "step 4 (push) expectation 1",
        "\
remote: -----> Using Python 3.13 specified in .python-version
remote: -----> Restoring cache
remote: -----> Installing Python 3.13.5
",
    )
    .unwrap();

    let mismatch = exp.check(output).unwrap_err();
    assert_eq!(mismatch.nearest_start, 2);
    assert_eq!(mismatch.nearest.len(), 3);
    assert_eq!(
        mismatch.nearest[0],
        "remote: -----> Using Python 3.13 specified in .python-version"
    );
    assert!(mismatch.diff.contains("-remote: -----> Restoring cache"));
    assert!(mismatch.diff.contains("+remote: -----> Discarding cache since:"));

    let report = mismatch.to_string();
    assert!(report.contains("expected transcript `step 4 (push) expectation 1` not found"));
    assert!(report.contains("nearest output (from line 2):"));
    assert!(report.contains("--- expected"));
    assert!(report.contains("+++ actual"));
}

#[test]
fn pattern_mismatch_hides_wildcard_matches_from_diff() {
    let exp = ExpectedTranscript::pattern(
        "paths",
        vec![
            lit("easy-install.pth:/tmp/build_"),
            Segment::Wildcard(Wildcard::NonEmpty),
            lit("/packages/a\nsecond line\n"),
        ],
    )
    .unwrap();
    let output = "easy-install.pth:/tmp/build_123/packages/a\nsomething else\n";

    let mismatch = exp.check(output).unwrap_err();
    assert!(mismatch.diff.contains(" easy-install.pth:/tmp/build_{{+}}/packages/a"));
    assert!(mismatch.diff.contains("-second line"));
    assert!(mismatch.diff.contains("+something else"));
    assert!(!mismatch.diff.contains("build_123"));
}

#[test]
fn mismatch_on_empty_output() {
    let exp = ExpectedTranscript::contains("anything", "remote: hello\n").unwrap();
    let mismatch = exp.check("").unwrap_err();
    assert!(mismatch.nearest.is_empty());
    assert!(mismatch.to_string().contains("output was empty"));
}

#[test]
fn raw_flag_is_carried() {
    let exp = ExpectedTranscript::contains("raw", "x").unwrap().with_raw(true);
    assert!(exp.uses_raw_output());
    assert_eq!(exp.label(), "raw");
    assert!(matches!(exp.matcher(), Matcher::Contains(_)));
}
