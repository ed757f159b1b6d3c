// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    pad_before_newline = { "remote:        \n", "remote:\n" },
    pad_before_crlf = { "remote:        \r\n", "remote:\r\n" },
    pad_before_cr = { "remote:        \r", "remote:\r" },
    double_pad = { "x                \n", "x\n" },
    partial_pad_kept = { "x            \n", "x    \n" },
    seven_spaces_kept = { "x       \n", "x       \n" },
    pad_without_newline_kept = { "x        ", "x        " },
    interior_spaces_kept = { "remote:        Collecting six\n", "remote:        Collecting six\n" },
    sgr_red = { "\x1b[1;31mError:\x1b[0m bad\n", "Error: bad\n" },
    bare_reset_kept = { "a\x1b[mb", "a\x1b[mb" },
    cursor_moves_kept = { "a\x1b[2Kb", "a\x1b[2Kb" },
    ansi_hiding_pad = { "x        \x1b[0m\n", "x\n" },
    nested_sgr = { "\x1b[\x1b[0m1mbold", "bold" },
)]
fn normalizes(input: &str, expected: &str) {
    assert_eq!(normalize(input), expected);
}

#[test]
fn leaves_clean_transcript_untouched() {
    let text = "remote: -----> Python app detected\nremote: -----> Installing pip 25.1.1\n";
    assert_eq!(normalize(text), text);
}

#[test]
fn strips_platform_noise_from_failed_build() {
    let raw = concat!(
        "remote:        ERROR: Invalid requirement\n",
        "remote:        \n",
        "remote: \x1b[1;31m !     Error: Unable to install dependencies using pip.\x1b[0m\n",
        "remote: \x1b[1;31m !     Push rejected, failed to compile Python app.\x1b[0m\n",
    );
    let expected = concat!(
        "remote:        ERROR: Invalid requirement\n",
        "remote:\n",
        "remote:  !     Error: Unable to install dependencies using pip.\n",
        "remote:  !     Push rejected, failed to compile Python app.\n",
    );
    assert_eq!(normalize(raw), expected);
}

fn noisy_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just("remote: ".to_string()),
        Just("        ".to_string()),
        Just("    ".to_string()),
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just("\r\n".to_string()),
        Just("\r".to_string()),
        Just("\x1b[".to_string()),
        Just("\x1b[0m".to_string()),
        Just("\x1b[1;33m".to_string()),
        Just("m".to_string()),
        Just("1;".to_string()),
        "[a-z]{1,4}",
    ];
    prop::collection::vec(piece, 0..40).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn normalize_is_idempotent(text in noisy_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
    }

    #[test]
    fn normalized_text_has_no_noise(text in noisy_text()) {
        let out = normalize(&text);
        let sgr = Regex::new(r"\x1b\[[0-9;]+m").unwrap();
        let pad = Regex::new(r" {8}(\r|\n)").unwrap();
        prop_assert!(!sgr.is_match(&out));
        prop_assert!(!pad.is_match(&out));
    }

    #[test]
    fn text_without_noise_is_unchanged(text in "[a-z :\\-]{0,60}(\n[a-z :\\-]{0,60}){0,5}") {
        let pad_at_end = Regex::new(r" {8}(\r|\n)").unwrap();
        prop_assume!(!pad_at_end.is_match(&text));
        prop_assert_eq!(normalize(&text), text);
    }
}
