// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Placeholder expansion for expected transcripts.
//!
//! Transcript text may contain `{{name}}` placeholders resolved from
//! [`TemplateVars`] (pinned versions, configured literals) and, in pattern
//! expectations only, the wildcards `{{*}}` (any text on one line, possibly
//! empty) and `{{+}}` (at least one character on one line).

use crate::transcript::{Segment, Wildcard};
use crate::versions::VersionRegistry;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors expanding a transcript template
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),

    #[error("empty placeholder at byte {0}")]
    Empty(usize),

    #[error("unknown template variable '{0}'")]
    UnknownVariable(String),

    #[error("wildcard '{{{{{0}}}}}' is only allowed in pattern expectations")]
    WildcardNotAllowed(String),
}

/// A lexical piece of a template
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Var(String),
    Wildcard(Wildcard),
}

/// Values available to `{{name}}` placeholders
#[derive(Clone, Debug, Default)]
pub struct TemplateVars {
    vars: BTreeMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose every pin as `versions.<package>`
    pub fn with_versions(mut self, registry: &VersionRegistry) -> Self {
        for (package, version) in registry.iter() {
            self.insert(format!("versions.{}", package), version);
        }
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Result<&str, TemplateError> {
        self.get(name)
            .ok_or_else(|| TemplateError::UnknownVariable(name.to_string()))
    }
}

/// Split template source into text, variables and wildcards.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            tokens.push(Token::Text(rest[..open].to_string()));
        }
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or(TemplateError::Unterminated(offset + open))?;
        let inner = after_open[..close].trim();
        let token = match inner {
            "" => return Err(TemplateError::Empty(offset + open)),
            "*" => Token::Wildcard(Wildcard::Any),
            "+" => Token::Wildcard(Wildcard::NonEmpty),
            name => Token::Var(name.to_string()),
        };
        tokens.push(token);

        let consumed = open + 2 + close + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    Ok(tokens)
}

/// Expand a template into plain text. Wildcards are rejected.
pub fn render_literal(source: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    for token in tokenize(source)? {
        match token {
            Token::Text(text) => out.push_str(&text),
            Token::Var(name) => out.push_str(vars.lookup(&name)?),
            Token::Wildcard(w) => {
                return Err(TemplateError::WildcardNotAllowed(w.marker().to_string()))
            }
        }
    }
    Ok(out)
}

/// Expand a template into pattern segments.
///
/// Variables become literal text; adjacent literals are merged.
pub fn render_segments(source: &str, vars: &TemplateVars) -> Result<Vec<Segment>, TemplateError> {
    let mut segments: Vec<Segment> = Vec::new();
    for token in tokenize(source)? {
        let literal = match token {
            Token::Text(text) => text,
            Token::Var(name) => vars.lookup(&name)?.to_string(),
            Token::Wildcard(w) => {
                segments.push(Segment::Wildcard(w));
                continue;
            }
        };
        match segments.last_mut() {
            Some(Segment::Literal(prev)) => prev.push_str(&literal),
            _ => segments.push(Segment::Literal(literal)),
        }
    }
    Ok(segments)
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
