//! Named and inline value transforms, and the pipelines built from them.

pub mod args;
pub mod builtin;

use args::parse_transform_spec;
use harvest_common::{TransformError, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A registered transform: receives the value and the arguments parsed from
/// its spec.
pub type TransformFn =
    Arc<dyn Fn(Value, &[Value]) -> Result<Value, TransformError> + Send + Sync>;

pub type InlineFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// One entry of a transform list.
#[derive(Clone)]
pub enum Transform {
    /// `name` or `name: arg1 arg2`, looked up in a registry.
    Named(String),
    Inline(InlineFn),
}

impl Transform {
    pub fn named(spec: impl Into<String>) -> Self {
        Transform::Named(spec.into())
    }

    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Transform::Inline(Arc::new(f))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Named(spec) => f.debug_tuple("Named").field(spec).finish(),
            Transform::Inline(_) => f.write_str("Inline(<fn>)"),
        }
    }
}

impl From<&str> for Transform {
    fn from(spec: &str) -> Self {
        Transform::Named(spec.to_string())
    }
}

impl From<String> for Transform {
    fn from(spec: String) -> Self {
        Transform::Named(spec)
    }
}

/// Named transforms available to selector strings and transform lists.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    entries: HashMap<String, TransformFn>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in transform library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Register a transform, replacing any previous entry with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Value, &[Value]) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&TransformFn> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Copy every entry of `other` into this registry. Entries of `other`
    /// win on name clashes.
    pub fn extend(&mut self, other: &TransformRegistry) {
        for (name, f) in &other.entries {
            self.entries.insert(name.clone(), Arc::clone(f));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("TransformRegistry")
            .field("names", &names)
            .finish()
    }
}

/// The three registries shared by every resolver of an extractor.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub transforms: TransformRegistry,
    pub arr_transforms: TransformRegistry,
    pub obj_transforms: TransformRegistry,
}

impl Registries {
    pub fn with_builtins() -> Self {
        Self {
            transforms: TransformRegistry::with_builtins(),
            arr_transforms: TransformRegistry::with_builtins(),
            obj_transforms: TransformRegistry::with_builtins(),
        }
    }
}

enum Step {
    Named {
        name: String,
        func: TransformFn,
        args: Vec<Value>,
    },
    Inline(InlineFn),
}

/// An ordered, bound chain of transforms.
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Resolve `raw` against `registry`. Inline entries pass through, named
    /// entries are parsed and bound to their arguments, and names the
    /// registry does not know are dropped.
    pub fn build(raw: &[Transform], registry: &TransformRegistry) -> Self {
        let steps = raw
            .iter()
            .filter_map(|transform| match transform {
                Transform::Inline(f) => Some(Step::Inline(Arc::clone(f))),
                Transform::Named(spec) => {
                    let parsed = parse_transform_spec(spec);
                    match registry.get(&parsed.name) {
                        Some(func) => Some(Step::Named {
                            name: parsed.name,
                            func: Arc::clone(func),
                            args: parsed.args,
                        }),
                        None => {
                            debug!(transform = %parsed.name, "Dropping unknown transform");
                            None
                        }
                    }
                }
            })
            .collect();
        Self { steps }
    }

    /// Run the chain left to right.
    pub fn apply(&self, value: Value) -> Result<Value, TransformError> {
        self.steps.iter().try_fold(value, |acc, step| match step {
            Step::Named { func, args, .. } => func(acc, args),
            Step::Inline(f) => Ok(f(acc)),
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Named { name, .. } => name.as_str(),
                Step::Inline(_) => "<inline>",
            })
            .collect()
    }
}

pub fn build_pipeline(raw: &[Transform], registry: &TransformRegistry) -> Pipeline {
    Pipeline::build(raw, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TransformRegistry {
        let mut registry = TransformRegistry::new();
        registry.register("one", |v, _| Ok(Value::from(format!("{} one", v))));
        registry.register("last", |v, args| {
            let tail: Vec<String> = args.iter().map(|a| a.to_display_string()).collect();
            Ok(Value::from(format!("{} {}.", v, tail.join(" "))))
        });
        registry
    }

    #[test]
    fn test_build_keeps_order_and_drops_unknown() {
        let raw = vec![
            Transform::named("one"),
            Transform::inline(|v| Value::from(format!("{} two", v))),
            Transform::named("three"),
            Transform::named("last:four"),
        ];
        let pipeline = build_pipeline(&raw, &registry());
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.names(), vec!["one", "<inline>", "last"]);

        let out = pipeline.apply(Value::from("raw value")).unwrap();
        assert_eq!(out, Value::from("raw value one two four."));
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = build_pipeline(&[], &registry());
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(Value::Number(3.0)).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_failing_step_rejects() {
        let mut registry = TransformRegistry::new();
        registry.register("boom", |_, _| Err(TransformError::new("boom", "nope")));
        let pipeline = build_pipeline(&[Transform::named("boom")], &registry);
        let err = pipeline.apply(Value::Null).unwrap_err();
        assert_eq!(err.name, "boom");
    }

    #[test]
    fn test_extend_overrides() {
        let mut base = TransformRegistry::with_builtins();
        let mut custom = TransformRegistry::new();
        custom.register("uppercase", |_, _| Ok(Value::from("custom")));
        base.extend(&custom);
        let pipeline = build_pipeline(&[Transform::named("uppercase")], &base);
        assert_eq!(pipeline.apply(Value::from("x")).unwrap(), Value::from("custom"));
    }
}
