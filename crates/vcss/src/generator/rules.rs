//! Splitting renderer output into per-selector rules.
//!
//! Renderers return plain CSS text that may touch several selectors:
//!
//! ```css
//! #block-1 { padding-top: 10px; }
//! #block-1:hover { color: red; }
//! ```
//!
//! The generator tracks each selector separately, so the text is split into
//! [`CssRule`]s. At-rules (`@supports ... { ... }`) are kept as one opaque rule.

use std::fmt;

use nom::{
    IResult,
    bytes::complete::take_till1,
    character::complete::multispace0,
    error::{Error, ErrorKind},
    multi::many0,
};

use crate::error::{Result, VcssError};

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn is_important(&self) -> bool {
        self.value
            .trim_end()
            .to_ascii_lowercase()
            .ends_with("!important")
    }

    /// Writes `property:value`, adding `!important` when asked and not already present.
    pub fn to_css(&self, important: bool) -> String {
        if important && !self.is_important() {
            format!("{}:{} !important", self.property, self.value)
        } else {
            format!("{}:{}", self.property, self.value)
        }
    }
}

/// The content of a rule block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleBody {
    Declarations(Vec<Declaration>),
    /// The raw inside of an at-rule block.
    Nested(String),
}

/// One selector and its declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub body: RuleBody,
}

impl CssRule {
    pub fn new(selector: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            selector: selector.into(),
            body: RuleBody::Declarations(declarations),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.body {
            RuleBody::Declarations(declarations) => declarations.is_empty(),
            RuleBody::Nested(raw) => raw.trim().is_empty(),
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        match &self.body {
            RuleBody::Declarations(declarations) => declarations,
            RuleBody::Nested(_) => &[],
        }
    }

    /// Writes the rule, optionally marking every declaration `!important`.
    ///
    /// At-rule bodies are written unchanged.
    pub fn to_css(&self, important: bool) -> String {
        match &self.body {
            RuleBody::Declarations(declarations) => {
                let body: Vec<String> = declarations.iter().map(|d| d.to_css(important)).collect();
                format!("{}{{{}}}", self.selector, body.join(";"))
            }
            RuleBody::Nested(raw) => format!("{}{{{}}}", self.selector, raw),
        }
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css(false))
    }
}

/// Splits CSS text into rules.
///
/// Empty input yields no rules. Text that is not a sequence of
/// `selector { ... }` blocks is an [`VcssError::InvalidSyntax`].
pub fn split_rules(css: &str) -> Result<Vec<CssRule>> {
    let (remaining, raw_rules) =
        many0(parse_raw_rule)(css).map_err(|e| VcssError::InvalidSyntax(e.to_string()))?;

    if !remaining.trim().is_empty() {
        return Err(VcssError::InvalidSyntax(format!(
            "Unexpected tokens at end of CSS: {}",
            remaining.trim()
        )));
    }

    raw_rules
        .into_iter()
        .map(|(selector, body)| {
            let selector = selector.trim();
            let body = if selector.starts_with('@') {
                RuleBody::Nested(body.trim().to_string())
            } else {
                RuleBody::Declarations(parse_declarations(body)?)
            };
            Ok(CssRule {
                selector: selector.to_string(),
                body,
            })
        })
        .collect()
}

/// Joins rules that share a selector, keeping first-occurrence order.
pub fn merge_by_selector(rules: Vec<CssRule>) -> Vec<CssRule> {
    let mut merged: Vec<CssRule> = Vec::new();
    for rule in rules {
        match merged.iter_mut().find(|r| r.selector == rule.selector) {
            Some(existing) => match (&mut existing.body, rule.body) {
                (RuleBody::Declarations(into), RuleBody::Declarations(from)) => into.extend(from),
                (RuleBody::Nested(into), RuleBody::Nested(from)) => into.push_str(&from),
                (body, from) => *body = from,
            },
            None => merged.push(rule),
        }
    }
    merged
}

/// Parses `selector { body }`, returning the raw selector and the inside of the block.
fn parse_raw_rule(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = multispace0(input)?;
    let (input, selector) = take_till1(|c: char| c == '{' || c == '}' || c == ';')(input)?;
    let (input, body) = take_balanced_block(input)?;
    Ok((input, (selector, body)))
}

fn take_balanced_block(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Char)));
    }
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        if c == '{' {
            depth += 1;
        } else if c == '}' {
            depth -= 1;
            if depth == 0 {
                return Ok((&input[i + 1..], &input[1..i]));
            }
        }
    }
    Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil)))
}

fn parse_declarations(body: &str) -> Result<Vec<Declaration>> {
    split_top_level(body, ';')
        .into_iter()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let (property, value) = chunk.split_once(':').ok_or_else(|| {
                VcssError::InvalidSyntax(format!("Declaration without a value: {chunk}"))
            })?;
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() || value.is_empty() {
                return Err(VcssError::InvalidSyntax(format!(
                    "Incomplete declaration: {chunk}"
                )));
            }
            Ok(Declaration::new(property, value))
        })
        .collect()
}

/// Splits on `separator` outside parentheses and quotes (`url(a;b)` stays whole).
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}
