//! Patterns: literal fragments and compiled pattern expressions.
//!
//! A literal pattern matches its text exactly and only ever replaces the first
//! occurrence. A pattern expression is compiled with the `regex` crate and
//! carries flags in the familiar `/source/flags` notation:
//!
//! | Flag | Meaning |
//! |------|---------|
//! | `d`  | match indices requested (accepted, no effect on replacement) |
//! | `g`  | global: replace every match |
//! | `i`  | case-insensitive |
//! | `m`  | `^`/`$` match at line boundaries |
//! | `s`  | `.` matches `\n` |
//! | `u`  | unicode (always on for this engine) |
//! | `y`  | sticky: matches must start where the previous one ended |
//!
//! `\d`, `\w` and `\b` are ASCII-only regardless of flags, and `\r`, `\n`
//! and `\r\n` all end a line.

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PatternError;
use crate::value::coerce_to_text;

/// Flags attached to a [`PatternExpression`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub has_indices: bool,
    pub global: bool,
    pub ignore_case: bool,
    pub multi_line: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub sticky: bool,
}

impl FromStr for Flags {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::default();
        for flag in text.chars() {
            let slot = match flag {
                'd' => &mut flags.has_indices,
                'g' => &mut flags.global,
                'i' => &mut flags.ignore_case,
                'm' => &mut flags.multi_line,
                's' => &mut flags.dot_all,
                'u' => &mut flags.unicode,
                'y' => &mut flags.sticky,
                other => return Err(PatternError::UnknownFlag(other)),
            };
            if *slot {
                return Err(PatternError::DuplicateFlag(flag));
            }
            *slot = true;
        }
        Ok(flags)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ordered = [
            (self.has_indices, 'd'),
            (self.global, 'g'),
            (self.ignore_case, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
            (self.unicode, 'u'),
            (self.sticky, 'y'),
        ];
        for (set, flag) in ordered {
            if set {
                write!(f, "{flag}")?;
            }
        }
        Ok(())
    }
}

/// A compiled pattern expression together with its source and flags.
#[derive(Debug, Clone)]
pub struct PatternExpression {
    source: String,
    flags: Flags,
    regex: Regex,
}

impl PatternExpression {
    /// Compiles `source` with the flags spelled out in `flags` (e.g. `"gi"`).
    ///
    /// ## Errors
    ///
    /// Returns [`PatternError::UnknownFlag`] or [`PatternError::DuplicateFlag`]
    /// for bad flags and [`PatternError::InvalidSource`] if the source does
    /// not compile.
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        Self::with_flags(source, flags.parse()?)
    }

    /// Compiles `source` with already parsed flags.
    ///
    /// `\d`, `\w` and `\b` (and their negations) keep their ASCII meaning,
    /// and `\r` counts as a line terminator for `^`, `$` and `.`.
    pub fn with_flags(source: &str, flags: Flags) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(&ascii_shorthands(source))
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .crlf(true)
            .build()?;

        Ok(Self {
            source: source.to_string(),
            flags,
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether every match is replaced rather than just the first.
    pub fn is_global(&self) -> bool {
        self.flags.global
    }

    pub fn is_sticky(&self) -> bool {
        self.flags.sticky
    }

    /// Whether the expression declares at least one named group.
    pub fn has_named_groups(&self) -> bool {
        self.regex.capture_names().flatten().next().is_some()
    }
}

impl PartialEq for PatternExpression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Display for PatternExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", escape_delimiters(&self.source), self.flags)
    }
}

/// What a replace operation looks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// An exact text fragment. Only the first occurrence is replaced.
    Literal(String),
    /// A compiled expression with flags.
    Expression(PatternExpression),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Builds an expression pattern from a source and a flag string.
    pub fn expression(source: &str, flags: &str) -> Result<Self, PatternError> {
        PatternExpression::new(source, flags).map(Pattern::Expression)
    }

    /// Parses the `/source/flags` notation.
    ///
    /// The source runs from the first to the last `/`; an escaped `\/` inside
    /// it stands for a plain `/`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use pipette::Pattern;
    ///
    /// let pattern = Pattern::parse_expression(r"/a\/b/gi").unwrap();
    /// assert_eq!(pattern.to_string(), r"/a\/b/gi");
    /// assert!(pattern.is_global());
    ///
    /// assert!(Pattern::parse_expression("no-slashes").is_err());
    /// ```
    pub fn parse_expression(text: &str) -> Result<Self, PatternError> {
        let malformed = |reason| PatternError::MalformedExpression {
            expression: text.to_string(),
            reason,
        };

        let rest = text
            .strip_prefix('/')
            .ok_or_else(|| malformed("expected a leading '/'"))?;
        let close = rest
            .rfind('/')
            .ok_or_else(|| malformed("expected a closing '/'"))?;
        let (raw_source, flags) = (&rest[..close], &rest[close + 1..]);
        if raw_source.is_empty() {
            return Err(malformed("empty source"));
        }

        Pattern::expression(&unescape_delimiters(raw_source), flags)
    }

    /// Interprets an untyped template argument as a pattern.
    ///
    /// Objects carrying a string `source` (and optionally string `flags`)
    /// become expressions; every other value is a literal of its text form.
    pub fn from_value(value: &Value) -> Result<Self, PatternError> {
        let Value::Object(map) = value else {
            return Ok(Pattern::Literal(coerce_to_text(value)));
        };
        let Some(Value::String(source)) = map.get("source") else {
            return Ok(Pattern::Literal(coerce_to_text(value)));
        };

        let flags = match map.get("flags") {
            None | Some(Value::Null) => "",
            Some(Value::String(flags)) => flags.as_str(),
            Some(_) => {
                return Err(PatternError::MalformedExpression {
                    expression: source.clone(),
                    reason: "flags must be text",
                });
            }
        };

        Pattern::expression(source, flags)
    }

    /// The untyped form understood by [`Pattern::from_value`].
    pub fn to_value(&self) -> Value {
        match self {
            Pattern::Literal(text) => Value::String(text.clone()),
            Pattern::Expression(expression) => {
                let mut map = Map::new();
                map.insert(
                    "source".to_string(),
                    Value::String(expression.source.clone()),
                );
                map.insert(
                    "flags".to_string(),
                    Value::String(expression.flags.to_string()),
                );
                Value::Object(map)
            }
        }
    }

    pub fn is_global(&self) -> bool {
        match self {
            Pattern::Literal(_) => false,
            Pattern::Expression(expression) => expression.is_global(),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Pattern::literal(text)
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Pattern::Literal(text)
    }
}

impl From<PatternExpression> for Pattern {
    fn from(expression: PatternExpression) -> Self {
        Pattern::Expression(expression)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => f.write_str(text),
            Pattern::Expression(expression) => fmt::Display::fmt(expression, f),
        }
    }
}

/// Rewrites the `\d \D \w \W \b \B` shorthands to their ASCII forms.
///
/// Inside a character class `\b` is a backspace.
fn ascii_shorthands(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut class_depth = 0usize;
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push('\\');
                    break;
                };
                let inside = class_depth > 0;
                match (next, inside) {
                    ('d', false) => out.push_str("[0-9]"),
                    ('D', false) => out.push_str("[^0-9]"),
                    ('w', false) => out.push_str("[0-9A-Za-z_]"),
                    ('W', false) => out.push_str("[^0-9A-Za-z_]"),
                    ('b', false) => out.push_str("(?-u:\\b)"),
                    ('B', false) => out.push_str("(?-u:\\B)"),
                    ('d', true) => out.push_str("[:digit:]"),
                    ('D', true) => out.push_str("[:^digit:]"),
                    ('w', true) => out.push_str("[:word:]"),
                    ('W', true) => out.push_str("[:^word:]"),
                    ('b', true) => out.push_str("\\x08"),
                    (other, _) => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            '[' => {
                class_depth += 1;
                out.push(c);
                // a `]` right after `[` or `[^` is a literal member
                if chars.as_str().starts_with('^') {
                    out.push('^');
                    chars.next();
                }
                if chars.as_str().starts_with(']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}

/// Turns `\/` into `/`, leaving every other escape for the regex compiler.
fn unescape_delimiters(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('/'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Inverse of [`unescape_delimiters`] for display.
fn escape_delimiters(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '/' => out.push_str("\\/"),
            other => out.push(other),
        }
    }
    out
}
