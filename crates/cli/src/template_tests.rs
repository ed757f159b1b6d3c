// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;

fn vars() -> TemplateVars {
    let registry = VersionRegistry::from_pins([("pip", "25.1.1"), ("uv", "0.7.12")]);
    let mut vars = TemplateVars::new().with_versions(&registry);
    vars.insert("vars.python_full", "3.13.5");
    vars.insert("stack", "heroku-24");
    vars
}

#[test]
fn tokenizes_text_vars_and_wildcards() {
    let tokens = tokenize("pip {{ versions.pip }} at /tmp/build_{{+}}/x{{*}}").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Text("pip ".to_string()),
            Token::Var("versions.pip".to_string()),
            Token::Text(" at /tmp/build_".to_string()),
            Token::Wildcard(Wildcard::NonEmpty),
            Token::Text("/x".to_string()),
            Token::Wildcard(Wildcard::Any),
        ]
    );
}

#[test]
fn plain_text_is_one_token() {
    assert_eq!(
        tokenize("remote: hello\n").unwrap(),
        vec![Token::Text("remote: hello\n".to_string())]
    );
    assert!(tokenize("").unwrap().is_empty());
}

#[test]
fn single_braces_are_text() {
    let text = "finder.py:/app/packages/local_package_pyproject_toml'}";
    assert_eq!(render_literal(text, &vars()).unwrap(), text);
}

#[test]
fn unterminated_placeholder_is_an_error() {
    assert_eq!(
        tokenize("abc {{versions.pip").unwrap_err(),
        TemplateError::Unterminated(4)
    );
}

#[test]
fn empty_placeholder_is_an_error() {
    assert_eq!(tokenize("x{{  }}").unwrap_err(), TemplateError::Empty(1));
}

#[test]
fn renders_literal_with_versions_and_vars() {
    let rendered = render_literal(
        "remote: -----> Installing Python {{vars.python_full}}\nremote: -----> Installing pip {{versions.pip}}\n",
        &vars(),
    )
    .unwrap();
    assert_eq!(
        rendered,
        "remote: -----> Installing Python 3.13.5\nremote: -----> Installing pip 25.1.1\n"
    );
}

#[test]
fn unknown_variable_is_an_error() {
    assert_eq!(
        render_literal("{{versions.poetry}}", &vars()).unwrap_err(),
        TemplateError::UnknownVariable("versions.poetry".to_string())
    );
}

#[test]
fn literal_rejects_wildcards() {
    let err = render_literal("build_{{+}}", &vars()).unwrap_err();
    assert_eq!(err, TemplateError::WildcardNotAllowed("+".to_string()));
    assert_eq!(
        err.to_string(),
        "wildcard '{{+}}' is only allowed in pattern expectations"
    );
}

#[test]
fn segments_merge_variables_into_literals() {
    let segments = render_segments("pip {{versions.pip}} from /tmp/build_{{+}}/site", &vars()).unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::Literal("pip 25.1.1 from /tmp/build_".to_string()),
            Segment::Wildcard(Wildcard::NonEmpty),
            Segment::Literal("/site".to_string()),
        ]
    );
}

#[test]
fn adjacent_wildcards_stay_separate() {
    let segments = render_segments("{{*}}{{+}}", &vars()).unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::Wildcard(Wildcard::Any),
            Segment::Wildcard(Wildcard::NonEmpty),
        ]
    );
}
