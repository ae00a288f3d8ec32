//! Shorthand constructors and fluent setters for building schemas in code.
//!
//! ```ignore
//! use harvest_core::schema::build::*;
//!
//! let schema = object([
//!     ("title", text("h1")),
//!     ("price", number(".price")),
//!     ("tags", text(vec![".tag"]).with_arr_transform("unique")),
//! ])
//! .scope_all("article");
//! ```

use super::{Schema, Scope, SimpleSelector, ValueKind};
use crate::coerce::{BooleanOptions, DateOptions, NumberOptions, RoundMode, StringOptions};
use crate::transform::Transform;
use harvest_common::Value;

/// Implicit text extraction.
pub fn text(selector: impl Into<SimpleSelector>) -> Schema {
    Schema::value(selector, ValueKind::default())
}

pub fn string(selector: impl Into<SimpleSelector>) -> Schema {
    Schema::value(selector, ValueKind::String(StringOptions::default()))
}

/// A string restricted to the first match of `pattern`.
pub fn matching(selector: impl Into<SimpleSelector>, pattern: impl Into<String>) -> Schema {
    Schema::value(
        selector,
        ValueKind::String(StringOptions {
            pattern: Some(pattern.into()),
            ..Default::default()
        }),
    )
}

pub fn number(selector: impl Into<SimpleSelector>) -> Schema {
    Schema::value(selector, ValueKind::Number(NumberOptions::default()))
}

/// A number rounded to an integer with `mode`.
pub fn integer(selector: impl Into<SimpleSelector>, mode: RoundMode) -> Schema {
    Schema::value(
        selector,
        ValueKind::Number(NumberOptions {
            int: true,
            round_mode: mode,
            ..Default::default()
        }),
    )
}

pub fn boolean(selector: impl Into<SimpleSelector>) -> Schema {
    Schema::value(selector, ValueKind::Boolean(BooleanOptions::default()))
}

/// A date rendered with `format` (`iso` when `None`).
pub fn date(selector: impl Into<SimpleSelector>, format: Option<&str>) -> Schema {
    Schema::value(
        selector,
        ValueKind::Date(DateOptions {
            format: format.map(str::to_string),
            ..Default::default()
        }),
    )
}

pub fn object<K, S, I>(fields: I) -> Schema
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<Schema>,
{
    Schema::object(fields)
}

/// An object whose keys merge into the enclosing object.
pub fn flat<K, S, I>(fields: I) -> Schema
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<Schema>,
{
    Schema::object(fields).flatten()
}

impl Schema {
    pub fn with_scope(mut self, scope: impl Into<Scope>) -> Self {
        self.options_mut().scope = Some(scope.into());
        self
    }

    /// Resolve once per descendant matching `query`.
    pub fn scope_all(self, query: impl Into<String>) -> Self {
        self.with_scope(Scope::all(query))
    }

    /// Resolve once per distinct parent of the selector's matches.
    pub fn auto_scope(self) -> Self {
        self.with_scope(Scope::auto())
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.options_mut().trim = Some(trim);
        self
    }

    pub fn with_transform(mut self, transform: impl Into<Transform>) -> Self {
        self.options_mut().transforms.push(transform.into());
        self
    }

    pub fn with_transform_fn<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.with_transform(Transform::inline(f))
    }

    pub fn with_arr_transform(mut self, transform: impl Into<Transform>) -> Self {
        self.options_mut().arr_transforms.push(transform.into());
        self
    }

    /// Only object schemas run object transforms; value schemas are returned
    /// unchanged.
    pub fn with_obj_transform(mut self, transform: impl Into<Transform>) -> Self {
        if let Schema::Object(object) = &mut self {
            object.obj_transforms.push(transform.into());
        }
        self
    }

    pub fn flatten(mut self) -> Self {
        self.options_mut().flat = true;
        self
    }

    /// Opts an object schema out of object resolution.
    pub fn disabled(mut self) -> Self {
        if let Schema::Object(object) = &mut self {
            object.enabled = false;
        }
        self
    }
}
