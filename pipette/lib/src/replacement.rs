//! Replacement values and `$`-template expansion.
//!
//! A [`Replacement::Template`] is expanded once per match:
//!
//! | Sequence   | Inserts |
//! |------------|---------|
//! | `$$`       | a literal `$` |
//! | `$&`       | the matched text |
//! | `` $` ``   | the text before the match |
//! | `$'`       | the text after the match |
//! | `$1`-`$99` | a capture group (unmatched groups insert nothing) |
//! | `$<name>`  | a named capture group |
//!
//! Anything that does not form one of these sequences is copied verbatim,
//! `$` included.

use std::fmt;
use std::sync::Arc;

use regex::Captures;
use serde_json::Value;

use crate::value::coerce_to_text;

/// Signature of a replacement function.
pub type ReplaceFn = Arc<dyn Fn(&Match<'_>) -> String + Send + Sync>;

/// A single match handed to a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    haystack: &'a str,
    start: usize,
    end: usize,
    groups: Vec<Option<&'a str>>,
    named: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> Match<'a> {
    /// A match of a literal pattern: no groups at all.
    pub(crate) fn literal(haystack: &'a str, start: usize, end: usize) -> Self {
        Self {
            haystack,
            start,
            end,
            groups: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Builds a match from regex captures.
    ///
    /// `names` pairs each named group's index with its name.
    pub(crate) fn from_captures(
        haystack: &'a str,
        captures: &Captures<'a>,
        names: &[(usize, &'a str)],
    ) -> Option<Self> {
        let whole = captures.get(0)?;
        let groups = (1..captures.len())
            .map(|index| captures.get(index).map(|group| group.as_str()))
            .collect();
        let named = names
            .iter()
            .map(|&(index, name)| (name, captures.get(index).map(|group| group.as_str())))
            .collect();

        Some(Self {
            haystack,
            start: whole.start(),
            end: whole.end(),
            groups,
            named,
        })
    }

    /// The matched text.
    pub fn as_str(&self) -> &'a str {
        &self.haystack[self.start..self.end]
    }

    /// Byte offset of the match in the input.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// The whole input the match was found in.
    pub fn haystack(&self) -> &'a str {
        self.haystack
    }

    pub fn before(&self) -> &'a str {
        &self.haystack[..self.start]
    }

    pub fn after(&self) -> &'a str {
        &self.haystack[self.end..]
    }

    /// Number of capture groups, not counting the whole match.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Capture group `index`; `0` is the whole match.
    pub fn group(&self, index: usize) -> Option<&'a str> {
        match index {
            0 => Some(self.as_str()),
            n => self.groups.get(n - 1).copied().flatten(),
        }
    }

    /// A named capture group, `None` when unknown or unmatched.
    pub fn name(&self, name: &str) -> Option<&'a str> {
        self.named
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .and_then(|(_, text)| *text)
    }

    pub fn has_named_groups(&self) -> bool {
        !self.named.is_empty()
    }
}

/// What a replace operation substitutes for each match.
#[derive(Clone)]
pub enum Replacement {
    /// Text with `$`-sequences expanded per match.
    Template(String),
    /// Computes the inserted text from the match; the result is inserted
    /// verbatim.
    Function(ReplaceFn),
}

impl Replacement {
    pub fn template(text: impl Into<String>) -> Self {
        Replacement::Template(text.into())
    }

    /// Wraps a closure as a replacement.
    ///
    /// ## Examples
    ///
    /// ```
    /// use pipette::{replace_text, Pattern, Replacement};
    ///
    /// let pattern = Pattern::expression(r"\d+", "g").unwrap();
    /// let doubled = Replacement::function(|m| {
    ///     let n: u32 = m.as_str().parse().unwrap_or_default();
    ///     (n * 2).to_string()
    /// });
    /// assert_eq!(replace_text("1 + 20", &pattern, &doubled), "2 + 40");
    /// ```
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Match<'_>) -> String + Send + Sync + 'static,
    {
        Replacement::Function(Arc::new(f))
    }

    /// Interprets an untyped template argument as a replacement template.
    pub fn from_value(value: &Value) -> Self {
        Replacement::Template(coerce_to_text(value))
    }

    /// Appends the text for `m` to `out`.
    pub fn render_into(&self, m: &Match<'_>, out: &mut String) {
        match self {
            Replacement::Template(template) => expand_template(template, m, out),
            Replacement::Function(f) => out.push_str(&f(m)),
        }
    }

    pub fn render(&self, m: &Match<'_>) -> String {
        let mut out = String::new();
        self.render_into(m, &mut out);
        out
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Replacement::template(text)
    }
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Replacement::Template(text)
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Replacement::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Expands `$`-sequences in `template` for one match.
pub fn expand_template(template: &str, m: &Match<'_>, out: &mut String) {
    let mut cursor = 0;
    while let Some(offset) = template[cursor..].find('$') {
        let dollar = cursor + offset;
        out.push_str(&template[cursor..dollar]);

        let rest = &template[dollar + 1..];
        let consumed = match rest.as_bytes().first() {
            Some(b'$') => {
                out.push('$');
                1
            }
            Some(b'&') => {
                out.push_str(m.as_str());
                1
            }
            Some(b'`') => {
                out.push_str(m.before());
                1
            }
            Some(b'\'') => {
                out.push_str(m.after());
                1
            }
            Some(b'0'..=b'9') => expand_numbered(rest.as_bytes(), m, out),
            Some(b'<') => expand_named(rest, m, out),
            _ => 0,
        };

        if consumed == 0 {
            out.push('$');
        }
        cursor = dollar + 1 + consumed;
    }
    out.push_str(&template[cursor..]);
}

/// Handles `$n` and `$nn`. Returns how many digits were consumed, 0 if the
/// sequence is not a valid group reference.
fn expand_numbered(digits: &[u8], m: &Match<'_>, out: &mut String) -> usize {
    let count = m.group_count();
    let first = usize::from(digits[0] - b'0');

    if let Some(second) = digits.get(1).filter(|b| b.is_ascii_digit()) {
        let index = first * 10 + usize::from(second - b'0');
        if (1..=count).contains(&index) {
            out.push_str(m.group(index).unwrap_or_default());
            return 2;
        }
    }

    if (1..=count).contains(&first) {
        out.push_str(m.group(first).unwrap_or_default());
        return 1;
    }

    0
}

/// Handles `$<name>`. Only active when the pattern declares named groups.
fn expand_named(rest: &str, m: &Match<'_>, out: &mut String) -> usize {
    if !m.has_named_groups() {
        return 0;
    }
    let Some(close) = rest.find('>') else {
        return 0;
    };

    out.push_str(m.name(&rest[1..close]).unwrap_or_default());
    close + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn expand(template: &str, m: &Match<'_>) -> String {
        let mut out = String::new();
        expand_template(template, m, &mut out);
        out
    }

    fn with_captures<R>(pattern: &str, haystack: &str, f: impl FnOnce(&Match<'_>) -> R) -> R {
        let regex = Regex::new(pattern).unwrap();
        let names: Vec<(usize, &str)> = regex
            .capture_names()
            .enumerate()
            .filter_map(|(index, name)| name.map(|name| (index, name)))
            .collect();
        let captures = regex.captures(haystack).unwrap();
        let m = Match::from_captures(haystack, &captures, &names).unwrap();
        f(&m)
    }

    #[test]
    fn test_plain_template_is_copied() {
        let m = Match::literal("abc", 1, 2);
        assert_eq!(expand("xyz", &m), "xyz");
        assert_eq!(expand("", &m), "");
    }

    #[test]
    fn test_special_sequences() {
        let m = Match::literal("abcde", 1, 3);
        assert_eq!(expand("[$&]", &m), "[bc]");
        assert_eq!(expand("$`", &m), "a");
        assert_eq!(expand("$'", &m), "de");
        assert_eq!(expand("$$", &m), "$");
        assert_eq!(expand("$$&", &m), "$&");
    }

    #[test]
    fn test_lone_and_trailing_dollar() {
        let m = Match::literal("abc", 0, 1);
        assert_eq!(expand("$", &m), "$");
        assert_eq!(expand("a$", &m), "a$");
        assert_eq!(expand("$x", &m), "$x");
        assert_eq!(expand("5$ off", &m), "5$ off");
    }

    #[test]
    fn test_groups_are_literal_without_captures() {
        let m = Match::literal("abc", 0, 1);
        assert_eq!(expand("$1", &m), "$1");
        assert_eq!(expand("$<name>", &m), "$<name>");
        assert_eq!(expand("$0", &m), "$0");
    }

    #[test]
    fn test_numbered_groups() {
        with_captures(r"(\w+) (\w+)", "hello world", |m| {
            assert_eq!(m.group_count(), 2);
            assert_eq!(expand("$2 $1", m), "world hello");
            assert_eq!(expand("$3", m), "$3");
            assert_eq!(expand("$0", m), "$0");
            assert_eq!(expand("$01", m), "hello");
        });
    }

    #[test]
    fn test_two_digit_falls_back_to_one_digit() {
        with_captures(r"(a)(b)", "ab", |m| {
            // no group 12, so this is group 1 followed by "2"
            assert_eq!(expand("$12", m), "a2");
        });
    }

    #[test]
    fn test_two_digit_group() {
        let pattern = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
        with_captures(pattern, "abcdefghijk", |m| {
            assert_eq!(expand("$11", m), "k");
            assert_eq!(expand("$10", m), "j");
        });
    }

    #[test]
    fn test_unmatched_group_is_empty() {
        with_captures(r"(a)|(b)", "b", |m| {
            assert_eq!(expand("[$1][$2]", m), "[][b]");
        });
    }

    #[test]
    fn test_named_groups() {
        with_captures(r"(?<year>\d{4})-(?<month>\d{2})", "2024-06", |m| {
            assert_eq!(expand("$<month>/$<year>", m), "06/2024");
            assert_eq!(expand("[$<day>]", m), "[]");
            assert_eq!(expand("$<year", m), "$<year");
            assert_eq!(m.name("year"), Some("2024"));
        });
    }

    #[test]
    fn test_named_syntax_literal_without_named_groups() {
        with_captures(r"(\d+)", "42", |m| {
            assert_eq!(expand("$<x>", m), "$<x>");
        });
    }

    #[test]
    fn test_match_accessors() {
        with_captures(r"b(c)", "abcd", |m| {
            assert_eq!(m.as_str(), "bc");
            assert_eq!(m.start(), 1);
            assert_eq!(m.end(), 3);
            assert_eq!(m.haystack(), "abcd");
            assert_eq!(m.group(0), Some("bc"));
            assert_eq!(m.group(1), Some("c"));
            assert_eq!(m.group(2), None);
            assert!(!m.has_named_groups());
        });
    }

    #[test]
    fn test_function_output_is_not_expanded() {
        let m = Match::literal("abc", 0, 1);
        let replacement = Replacement::function(|_| "$&".to_string());
        assert_eq!(replacement.render(&m), "$&");
    }

    #[test]
    fn test_from_value_coerces() {
        let replacement = Replacement::from_value(&serde_json::json!(7));
        assert!(matches!(replacement, Replacement::Template(ref t) if t == "7"));
    }

    #[test]
    fn test_debug_hides_function() {
        let replacement = Replacement::function(|m| m.as_str().to_uppercase());
        assert_eq!(format!("{replacement:?}"), "Function(..)");
        assert_eq!(
            format!("{:?}", Replacement::template("x")),
            "Template(\"x\")"
        );
    }
}
