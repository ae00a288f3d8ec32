//! Selector schemas.
//!
//! A schema is decided once into either a value schema (one typed value, or
//! a list of them) or an object schema (named child schemas). Bare strings
//! and string lists normalise to implicit value schemas.

pub mod build;
mod load;

use crate::coerce::{BooleanOptions, DateOptions, NumberOptions, StringOptions};
use crate::transform::Transform;
use indexmap::IndexMap;

/// The selector of a value schema. Only the first entry of a list is used
/// as the query; a list selects every match.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    One(String),
    All(Vec<String>),
}

impl SimpleSelector {
    pub fn all(query: impl Into<String>) -> Self {
        SimpleSelector::All(vec![query.into()])
    }

    /// The selector string in effect.
    pub fn active(&self) -> Option<&str> {
        match self {
            SimpleSelector::One(query) => Some(query),
            SimpleSelector::All(queries) => queries.first().map(String::as_str),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SimpleSelector::All(_))
    }
}

impl From<&str> for SimpleSelector {
    fn from(query: &str) -> Self {
        SimpleSelector::One(query.to_string())
    }
}

impl From<String> for SimpleSelector {
    fn from(query: String) -> Self {
        SimpleSelector::One(query)
    }
}

impl From<Vec<String>> for SimpleSelector {
    fn from(queries: Vec<String>) -> Self {
        SimpleSelector::All(queries)
    }
}

impl From<Vec<&str>> for SimpleSelector {
    fn from(queries: Vec<&str>) -> Self {
        SimpleSelector::All(queries.into_iter().map(str::to_string).collect())
    }
}

/// Narrows the node a schema resolves against.
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    /// First descendant matching the query. An empty query means no scope.
    First(String),
    /// Every descendant matching the first query. An empty list, or an empty
    /// first query, infers the scopes from the parents of the selector's
    /// matches.
    All(Vec<String>),
}

impl Scope {
    pub fn all(query: impl Into<String>) -> Self {
        Scope::All(vec![query.into()])
    }

    pub fn auto() -> Self {
        Scope::All(Vec::new())
    }
}

impl From<&str> for Scope {
    fn from(query: &str) -> Self {
        Scope::First(query.to_string())
    }
}

impl From<String> for Scope {
    fn from(query: String) -> Self {
        Scope::First(query)
    }
}

/// Options every schema shape carries.
#[derive(Debug, Clone, Default)]
pub struct SelectorOptions {
    pub scope: Option<Scope>,
    /// `Some(false)` disables trimming of extracted text.
    pub trim: Option<bool>,
    pub transforms: Vec<Transform>,
    pub arr_transforms: Vec<Transform>,
    /// Merge an object result into the parent object instead of nesting it.
    pub flat: bool,
}

/// The coercion a value schema requests.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// No type flag given.
    Implicit(StringOptions),
    String(StringOptions),
    Number(NumberOptions),
    Boolean(BooleanOptions),
    Date(DateOptions),
    /// `string: false` without another type flag. No built-in resolver
    /// claims it.
    Unclaimed,
}

impl Default for ValueKind {
    fn default() -> Self {
        ValueKind::Implicit(StringOptions::default())
    }
}

#[derive(Debug, Clone)]
pub struct ValueSchema {
    pub selector: SimpleSelector,
    pub kind: ValueKind,
    pub options: SelectorOptions,
}

#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub fields: IndexMap<String, Schema>,
    pub options: SelectorOptions,
    pub obj_transforms: Vec<Transform>,
    /// `false` opts the map out of object resolution.
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub enum Schema {
    Value(ValueSchema),
    Object(ObjectSchema),
}

impl Schema {
    pub fn value(selector: impl Into<SimpleSelector>, kind: ValueKind) -> Self {
        Schema::Value(ValueSchema {
            selector: selector.into(),
            kind,
            options: SelectorOptions::default(),
        })
    }

    pub fn object<K, S, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Schema>,
    {
        Schema::Object(ObjectSchema {
            fields: fields
                .into_iter()
                .map(|(key, schema)| (key.into(), schema.into()))
                .collect(),
            options: SelectorOptions::default(),
            obj_transforms: Vec::new(),
            enabled: true,
        })
    }

    pub fn options(&self) -> &SelectorOptions {
        match self {
            Schema::Value(schema) => &schema.options,
            Schema::Object(schema) => &schema.options,
        }
    }

    pub fn options_mut(&mut self) -> &mut SelectorOptions {
        match self {
            Schema::Value(schema) => &mut schema.options,
            Schema::Object(schema) => &mut schema.options,
        }
    }

    /// A copy of this schema as a field of an object with `parent` options:
    /// `trim` is inherited when unset and the parent's transforms run after
    /// the field's own.
    pub fn inherit(&self, parent: &SelectorOptions) -> Schema {
        let mut child = self.clone();
        let options = child.options_mut();
        if options.trim.is_none() {
            options.trim = parent.trim;
        }
        options.transforms.extend(parent.transforms.iter().cloned());
        options
            .arr_transforms
            .extend(parent.arr_transforms.iter().cloned());
        child
    }
}

impl From<&str> for Schema {
    fn from(selector: &str) -> Self {
        Schema::value(selector, ValueKind::default())
    }
}

impl From<String> for Schema {
    fn from(selector: String) -> Self {
        Schema::value(selector, ValueKind::default())
    }
}

impl From<Vec<&str>> for Schema {
    fn from(selectors: Vec<&str>) -> Self {
        Schema::value(selectors, ValueKind::default())
    }
}

impl From<Vec<String>> for Schema {
    fn from(selectors: Vec<String>) -> Self {
        Schema::value(selectors, ValueKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_selector_is_first_entry() {
        let selector = SimpleSelector::from(vec!["li", "ignored"]);
        assert_eq!(selector.active(), Some("li"));
        assert!(selector.is_all());
        assert_eq!(SimpleSelector::All(vec![]).active(), None);
    }

    #[test]
    fn test_inherit_appends_parent_transforms() {
        let parent = SelectorOptions {
            trim: Some(false),
            transforms: vec![Transform::named("parent")],
            arr_transforms: vec![Transform::named("parent_arr")],
            ..Default::default()
        };
        let mut field = Schema::from("h1");
        field.options_mut().transforms.push(Transform::named("own"));

        let inherited = field.inherit(&parent);
        let options = inherited.options();
        assert_eq!(options.trim, Some(false));
        let names: Vec<_> = options
            .transforms
            .iter()
            .map(|t| format!("{:?}", t))
            .collect();
        assert_eq!(names, vec!["Named(\"own\")", "Named(\"parent\")"]);
        assert_eq!(options.arr_transforms.len(), 1);

        // the original is untouched
        assert_eq!(field.options().transforms.len(), 1);
        assert_eq!(field.options().trim, None);
    }

    #[test]
    fn test_inherit_keeps_explicit_trim() {
        let parent = SelectorOptions {
            trim: Some(false),
            ..Default::default()
        };
        let mut field = Schema::from("h1");
        field.options_mut().trim = Some(true);
        assert_eq!(field.inherit(&parent).options().trim, Some(true));
    }
}
