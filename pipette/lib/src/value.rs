//! Classification and text coercion of untyped template values.
//!
//! Template engines hand transforms loosely typed arguments. Inputs are
//! represented as [`serde_json::Value`]; only [`Value::String`] counts as text.

use serde_json::Value;

/// The input of a transform, split into the two cases a transform cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input<'a> {
    /// A textual value that can be transformed.
    Text(&'a str),
    /// Anything else. Transforms hand these back untouched.
    NonText(&'a Value),
}

impl<'a> Input<'a> {
    /// Classifies an untyped value.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(text) => Input::Text(text),
            other => Input::NonText(other),
        }
    }

    /// Returns the text when the input is textual.
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Input::Text(text) => Some(text),
            Input::NonText(_) => None,
        }
    }
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        Input::classify(value)
    }
}

/// Converts any value to text the way dynamic template languages stringify
/// arguments.
///
/// ## Examples
///
/// ```
/// use pipette::coerce_to_text;
/// use serde_json::json;
///
/// assert_eq!(coerce_to_text(&json!("abc")), "abc");
/// assert_eq!(coerce_to_text(&json!(null)), "null");
/// assert_eq!(coerce_to_text(&json!(2.0)), "2");
/// assert_eq!(coerce_to_text(&json!([1, null, "x"])), "1,,x");
/// assert_eq!(coerce_to_text(&json!({"a": 1})), "[object Object]");
/// ```
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number_to_text(number),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_text(number: &serde_json::Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }

    match number.as_f64() {
        Some(float) if float == 0.0 => "0".to_string(),
        Some(float) if !(1e-6..1e21).contains(&float.abs()) => exponent_text(float),
        Some(float) if float.fract() == 0.0 => format!("{float:.0}"),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

/// Exponent notation with an explicit sign on the exponent (`1e+21`, `1.5e-7`).
fn exponent_text(float: f64) -> String {
    let text = format!("{float:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => text,
    }
}
