//! Pipette - named display transforms for template rendering
//!
//! Template engines format values through small named transforms
//! (`{{ title | replace: "-" : " " }}`). This library provides the `replace`
//! transform and a registry that maps names to transforms.
//!
//! Transforms never fail on bad arguments: non-text input, or a missing
//! pattern or replacement, hands the input back unchanged so that a broken
//! binding cannot break a render.
//!
//! ## Modules
//!
//! - [`pattern`] - Literal patterns and flagged pattern expressions
//! - [`replacement`] - Replacement templates (`$1`, `$&`, `$<name>`) and functions
//! - [`replace`] - Substitution on text and the guarded [`transform()`]
//! - [`transform`](mod@transform) - The [`Transform`] trait and [`ReplaceTransform`]
//! - [`registry`] - [`TransformRegistry`], the name lookup table
//! - [`value`] - Text classification and coercion of untyped values
//!
//! ## Examples
//!
//! ```
//! use pipette::{transform, Pattern, Replacement};
//! use serde_json::json;
//!
//! let every_a = Pattern::expression("a", "g").unwrap();
//! let b = Replacement::template("b");
//! assert_eq!(transform(&json!("aaa"), Some(&every_a), Some(&b)), json!("bbb"));
//! ```

pub mod error;
pub mod pattern;
pub mod registry;
pub mod replace;
pub mod replacement;
pub mod transform;
pub mod value;

pub use error::{PatternError, TransformError};
pub use pattern::{Flags, Pattern, PatternExpression};
pub use registry::TransformRegistry;
pub use replace::{replace_text, transform};
pub use replacement::{Match, ReplaceFn, Replacement};
pub use transform::{ReplaceTransform, Transform};
pub use value::{Input, coerce_to_text};
