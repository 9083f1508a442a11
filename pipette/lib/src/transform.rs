//! Named transforms invocable with untyped template arguments.

use serde_json::Value;
use tracing::{debug, warn};

use crate::pattern::Pattern;
use crate::replace::transform;
use crate::replacement::Replacement;

/// A display transform that a template engine can call by name.
///
/// Implementations must never fail: arguments that do not make sense should
/// hand the input back unchanged.
pub trait Transform: Send + Sync {
    /// The name templates use to invoke this transform.
    fn name(&self) -> &str;

    /// Applies the transform to `input` with positional `args`.
    fn apply(&self, input: &Value, args: &[Value]) -> Value;
}

/// The `replace` transform: `input | replace: pattern : replacement`.
///
/// `args[0]` is the pattern and `args[1]` the replacement. A missing
/// argument counts as absent. Pattern objects of the form
/// `{"source": "...", "flags": "..."}` are compiled as expressions; any other
/// value is used as literal text.
///
/// ## Examples
///
/// ```
/// use pipette::{ReplaceTransform, Transform};
/// use serde_json::json;
///
/// let replace = ReplaceTransform;
/// let out = replace.apply(&json!("aaa"), &[json!({"source": "a", "flags": "g"}), json!("b")]);
/// assert_eq!(out, json!("bbb"));
///
/// let out = replace.apply(&json!("aaa"), &[json!("a")]);
/// assert_eq!(out, json!("aaa"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceTransform;

impl ReplaceTransform {
    pub const NAME: &'static str = "replace";
}

impl Transform for ReplaceTransform {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, input: &Value, args: &[Value]) -> Value {
        let pattern = match args.first().map(Pattern::from_value).transpose() {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!(error = %err, "replace: invalid pattern argument, passing input through");
                return input.clone();
            }
        };
        let replacement = args.get(1).map(Replacement::from_value);

        if args.len() > 2 {
            debug!(extra = args.len() - 2, "replace: ignoring extra arguments");
        }

        transform(input, pattern.as_ref(), replacement.as_ref())
    }
}
