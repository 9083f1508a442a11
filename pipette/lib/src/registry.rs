//! Lookup table mapping transform names to implementations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::TransformError;
use crate::transform::{ReplaceTransform, Transform};

/// Transforms addressable by name.
///
/// A template integration layer owns one registry and resolves each
/// `value | name: args...` expression through [`TransformRegistry::apply`].
///
/// ## Examples
///
/// ```
/// use pipette::TransformRegistry;
/// use serde_json::json;
///
/// let registry = TransformRegistry::with_builtins();
/// let out = registry
///     .apply("replace", &json!("hello world"), &[json!("world"), json!("there")])
///     .unwrap();
/// assert_eq!(out, json!("hello there"));
///
/// assert!(registry.apply("missing", &json!("x"), &[]).is_err());
/// ```
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in transform registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ReplaceTransform);
        registry
    }

    /// Registers `transform` under its own name.
    ///
    /// Returns the transform previously registered under that name, if any.
    pub fn register<T>(&mut self, transform: T) -> Option<Arc<dyn Transform>>
    where
        T: Transform + 'static,
    {
        self.register_shared(Arc::new(transform))
    }

    /// Registers an already shared transform.
    pub fn register_shared(&mut self, transform: Arc<dyn Transform>) -> Option<Arc<dyn Transform>> {
        let name = transform.name().to_string();
        debug!(transform = %name, "registering transform");
        self.transforms.insert(name, transform)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Transform>> {
        self.transforms.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Applies the transform registered as `name`.
    ///
    /// ## Errors
    ///
    /// Returns [`TransformError::UnknownTransform`] when nothing is registered
    /// under `name`. The transform itself never fails.
    pub fn apply(
        &self,
        name: &str,
        input: &Value,
        args: &[Value],
    ) -> Result<Value, TransformError> {
        let transform = self.get(name).ok_or_else(|| TransformError::UnknownTransform {
            name: name.to_string(),
        })?;
        Ok(transform.apply(input, args))
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    impl Transform for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn apply(&self, input: &Value, _args: &[Value]) -> Value {
            match input {
                Value::String(text) => Value::String(text.to_uppercase()),
                other => other.clone(),
            }
        }
    }

    /// Shadows the built-in `replace` to prove registration overwrites.
    struct Shout;

    impl Transform for Shout {
        fn name(&self) -> &str {
            "replace"
        }

        fn apply(&self, _input: &Value, _args: &[Value]) -> Value {
            json!("!")
        }
    }

    #[test]
    fn test_new_is_empty() {
        let registry = TransformRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("replace"));
    }

    #[test]
    fn test_builtins_include_replace() {
        let registry = TransformRegistry::with_builtins();
        assert!(registry.contains("replace"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["replace"]);
    }

    #[test]
    fn test_apply_unknown_transform() {
        let registry = TransformRegistry::with_builtins();
        let err = registry.apply("nope", &json!("x"), &[]).unwrap_err();
        assert_eq!(
            err,
            TransformError::UnknownTransform {
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_register_custom_transform() {
        let mut registry = TransformRegistry::with_builtins();
        assert!(registry.register(Upper).is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["replace", "upper"]);
        assert_eq!(registry.apply("upper", &json!("abc"), &[]).unwrap(), json!("ABC"));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = TransformRegistry::with_builtins();
        let previous = registry.register(Shout);
        assert_eq!(previous.map(|t| t.name().to_string()), Some("replace".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.apply("replace", &json!("a"), &[]).unwrap(), json!("!"));
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        let registry = Arc::new(TransformRegistry::with_builtins());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .apply("replace", &json!(format!("n{i}")), &[json!("n"), json!("#")])
                        .unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), json!(format!("#{i}")));
        }
    }

    #[test]
    fn test_debug_lists_names() {
        let registry = TransformRegistry::with_builtins();
        assert_eq!(
            format!("{registry:?}"),
            "TransformRegistry { transforms: [\"replace\"] }"
        );
    }
}
