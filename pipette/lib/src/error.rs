use thiserror::Error;

/// Errors raised while building a [`Pattern`](crate::Pattern).
///
/// The replace transform itself never fails; these only surface from the
/// constructors so callers can report a malformed pattern to the user.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The expression source could not be compiled.
    #[error("Invalid pattern source: {0}")]
    InvalidSource(#[from] regex::Error),

    /// A flag character that the engine does not know.
    #[error("Unknown pattern flag '{0}'")]
    UnknownFlag(char),

    /// The same flag was given more than once.
    #[error("Duplicate pattern flag '{0}'")]
    DuplicateFlag(char),

    /// The `/source/flags` notation could not be split.
    #[error("Malformed pattern expression '{expression}': {reason}")]
    MalformedExpression {
        /// The text that failed to parse.
        expression: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// Errors returned by the [`TransformRegistry`](crate::TransformRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// No transform is registered under the requested name.
    #[error("Unknown transform '{name}'")]
    UnknownTransform {
        /// The name that was looked up.
        name: String,
    },
}
