#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn error_plain_text_when_not_terminal() {
    let mut buf = Vec::new();
    write_error(&mut buf, "something went wrong", false);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "Error: something went wrong\n");
}

#[test]
fn error_with_ansi_when_terminal() {
    let mut buf = Vec::new();
    write_error(&mut buf, "something went wrong", true);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "\x1b[31mError: something went wrong\x1b[0m\n");
}

#[test]
fn warning_plain_text_when_not_terminal() {
    let mut buf = Vec::new();
    write_warning(&mut buf, "something might be wrong", false);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "Warning: something might be wrong\n");
}

#[test]
fn warning_with_ansi_when_terminal() {
    let mut buf = Vec::new();
    write_warning(&mut buf, "something might be wrong", true);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "\x1b[33mWarning: something might be wrong\x1b[0m\n");
}

#[test]
fn error_with_format_args() {
    let mut buf = Vec::new();
    write_error(&mut buf, format_args!("failed after {} attempts", 3), false);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "Error: failed after 3 attempts\n");
}

#[test]
fn warning_with_format_args() {
    let mut buf = Vec::new();
    write_warning(&mut buf, format_args!("retrying {} times", 5), false);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "Warning: retrying 5 times\n");
}

#[test]
fn result_plain_text_when_not_terminal() {
    let mut buf = Vec::new();
    write_result(&mut buf, Tag::Pass, "pip cache reuse (1.2s)", None, false);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "PASS pip cache reuse (1.2s)\n");
}

#[test]
fn result_tag_coloured_when_terminal() {
    let mut buf = Vec::new();
    write_result(&mut buf, Tag::Fail, "wrong order", None, true);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "\x1b[31mFAIL\x1b[0m wrong order\n");

    let mut buf = Vec::new();
    write_result(&mut buf, Tag::Skip, "heroku-22 only", None, true);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "\x1b[33mSKIP\x1b[0m heroku-22 only\n");
}

#[test]
fn result_details_end_with_newline() {
    let mut buf = Vec::new();
    write_result(&mut buf, Tag::Fail, "x", Some("  step 1 (deploy): boom"), false);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "FAIL x\n  step 1 (deploy): boom\n");

    let mut buf = Vec::new();
    write_result(&mut buf, Tag::Fail, "x", Some("  already terminated\n"), false);
    let output = String::from_utf8(buf).unwrap();
    assert_eq!(output, "FAIL x\n  already terminated\n");
}
