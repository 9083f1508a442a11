//! Pattern substitution on text, and the guarded transform built on it.

use std::borrow::Cow;

use serde_json::Value;
use tracing::trace;

use crate::pattern::{Pattern, PatternExpression};
use crate::replacement::{Match, Replacement};
use crate::value::Input;

/// Replaces `pattern` in `input` with `replacement`.
///
/// - A literal pattern replaces its first occurrence only.
/// - An expression replaces its first match, or every match when global.
/// - A sticky expression only matches where the previous match ended,
///   starting at offset 0.
///
/// Returns `Cow::Borrowed` when nothing matched.
///
/// ## Examples
///
/// ```
/// use pipette::{replace_text, Pattern, Replacement};
///
/// let b = Replacement::template("b");
/// assert_eq!(replace_text("aaa", &Pattern::literal("a"), &b), "baa");
///
/// let every_a = Pattern::expression("a", "g").unwrap();
/// assert_eq!(replace_text("aaa", &every_a, &b), "bbb");
///
/// let swap = Pattern::expression(r"(\w+) (\w+)", "").unwrap();
/// assert_eq!(replace_text("hello world", &swap, &"$2 $1".into()), "world hello");
/// ```
pub fn replace_text<'a>(
    input: &'a str,
    pattern: &Pattern,
    replacement: &Replacement,
) -> Cow<'a, str> {
    match pattern {
        Pattern::Literal(needle) => replace_literal(input, needle, replacement),
        Pattern::Expression(expression) => replace_expression(input, expression, replacement),
    }
}

fn replace_literal<'a>(input: &'a str, needle: &str, replacement: &Replacement) -> Cow<'a, str> {
    let Some(start) = input.find(needle) else {
        return Cow::Borrowed(input);
    };
    let m = Match::literal(input, start, start + needle.len());

    let mut out = String::with_capacity(input.len());
    out.push_str(m.before());
    replacement.render_into(&m, &mut out);
    out.push_str(m.after());
    Cow::Owned(out)
}

fn replace_expression<'a>(
    input: &'a str,
    expression: &PatternExpression,
    replacement: &Replacement,
) -> Cow<'a, str> {
    let regex = expression.regex();
    let names: Vec<(usize, &str)> = regex
        .capture_names()
        .enumerate()
        .filter_map(|(index, name)| name.map(|name| (index, name)))
        .collect();

    let mut out: Option<String> = None;
    let mut copied_to = 0;
    let mut search_at = 0;

    while search_at <= input.len() {
        let Some(captures) = regex.captures_at(input, search_at) else {
            break;
        };
        let Some(m) = Match::from_captures(input, &captures, &names) else {
            break;
        };
        if expression.is_sticky() && m.start() != search_at {
            break;
        }

        let buf = out.get_or_insert_with(|| String::with_capacity(input.len()));
        buf.push_str(&input[copied_to..m.start()]);
        replacement.render_into(&m, buf);
        copied_to = m.end();

        if !expression.is_global() {
            break;
        }
        search_at = if m.start() == m.end() {
            next_boundary(input, m.end())
        } else {
            m.end()
        };
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&input[copied_to..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(input),
    }
}

/// The offset one character past `at`, or past the end of `input`.
fn next_boundary(input: &str, at: usize) -> usize {
    input[at..]
        .chars()
        .next()
        .map_or(at + 1, |c| at + c.len_utf8())
}

/// The replace transform over untyped input.
///
/// Non-text input, an absent pattern, or an absent replacement all hand the
/// input back unchanged. Otherwise the result is the substituted text.
///
/// ## Examples
///
/// ```
/// use pipette::{transform, Pattern, Replacement};
/// use serde_json::json;
///
/// let pattern = Pattern::literal("world");
/// let replacement = Replacement::template("there");
///
/// let out = transform(&json!("hello world"), Some(&pattern), Some(&replacement));
/// assert_eq!(out, json!("hello there"));
///
/// let out = transform(&json!(42), Some(&pattern), Some(&replacement));
/// assert_eq!(out, json!(42));
///
/// let out = transform(&json!("hello world"), None, Some(&replacement));
/// assert_eq!(out, json!("hello world"));
/// ```
pub fn transform(
    input: &Value,
    pattern: Option<&Pattern>,
    replacement: Option<&Replacement>,
) -> Value {
    let Input::Text(text) = Input::classify(input) else {
        trace!(input = %input, "replace: input is not text, passing through");
        return input.clone();
    };
    let (Some(pattern), Some(replacement)) = (pattern, replacement) else {
        trace!(
            pattern_present = pattern.is_some(),
            replacement_present = replacement.is_some(),
            "replace: missing argument, passing through"
        );
        return input.clone();
    };

    match replace_text(text, pattern, replacement) {
        Cow::Borrowed(_) => input.clone(),
        Cow::Owned(replaced) => Value::String(replaced),
    }
}
